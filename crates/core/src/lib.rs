#![warn(clippy::all, missing_docs)]

//! Client binding for the Buy Me a Pie shopping-list service.
//!
//! An [`Account`] owns the transport and lazily fetches restrictions, lists
//! and the unique-item catalog. Lists, items and unique items are proxies
//! over the last server snapshot; mutations push a request and fold the
//! answer back into the proxy.

pub mod account;
pub mod config;
pub mod entities;
pub mod error;
pub mod models;
pub mod palette;
pub mod transport;

pub use account::{Account, Cached, Catalog};
pub use crate::config::AppConfig;
pub use entities::{Item, List, UniqueItem};
pub use error::{Error, Result};
pub use models::Restrictions;
pub use transport::{Api, HttpTransport, Method, Transport};
