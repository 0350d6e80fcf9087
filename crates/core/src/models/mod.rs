//! Wire records exchanged with the Buy Me a Pie API.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Account plan limits returned by `GET restrictions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restrictions {
    pub premium: bool,
    #[serde(default, deserialize_with = "timestamp")]
    pub premium_expiration_timestamp: Option<i64>,
    #[serde(rename = "maxListsCount")]
    pub max_lists_count: u32,
}

impl Restrictions {
    /// Premium expiration as a UTC timestamp, when the server reports one.
    pub fn premium_expiration(&self) -> Option<DateTime<Utc>> {
        self.premium_expiration_timestamp.and_then(to_datetime)
    }
}

/// A shopping list as returned by the `lists` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRecord {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: Vec<String>,
    #[serde(default)]
    pub items_not_purchased: u32,
    #[serde(default)]
    pub items_purchased: u32,
}

/// A line entry of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: String,
    #[serde(default)]
    pub is_purchased: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// A catalog entry from the `unique_items` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueItemRecord {
    pub title: String,
    #[serde(default)]
    pub use_count: u64,
    #[serde(default, deserialize_with = "timestamp")]
    pub last_use: Option<i64>,
    #[serde(default)]
    pub group_id: i64,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub permanent: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewList<'a> {
    pub items_not_purchased: u32,
    pub items_purchased: u32,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListUpdate<'a> {
    pub emails: &'a [String],
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewItem<'a> {
    pub amount: &'a str,
    pub is_purchased: bool,
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ItemUpdate<'a> {
    pub is_purchased: bool,
    pub title: &'a str,
    pub amount: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewUniqueItem {
    pub group_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permanent: Option<bool>,
    pub use_count: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct UniqueItemUpdate {
    pub use_count: u64,
    pub permanent: bool,
    pub group_id: i64,
}

/// Timestamps above this are taken to be milliseconds since the epoch.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

pub(crate) fn to_datetime(raw: i64) -> Option<DateTime<Utc>> {
    if raw.abs() >= MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(raw).single()
    } else {
        Utc.timestamp_opt(raw, 0).single()
    }
}

fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(num) => Ok(num.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(num)) => Ok(num
            .as_i64()
            .or_else(|| num.as_f64().map(|value| value as i64))),
        Some(other) => Err(de::Error::custom(format!(
            "expected numeric timestamp, got {other}"
        ))),
    }
}
