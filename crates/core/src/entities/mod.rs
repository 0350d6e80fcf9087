//! In-memory proxies for server-side records.
//!
//! Each proxy wraps the last snapshot the server returned and exposes
//! mutators that push a request and splice the answer back in. Proxies hold
//! no reference to the session; calls that reach the network take an
//! [`Api`](crate::transport::Api) handle.

mod item;
mod list;
pub(crate) mod unique_item;

pub use item::Item;
pub use list::List;
pub use unique_item::UniqueItem;
