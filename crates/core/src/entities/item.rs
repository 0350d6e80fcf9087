use std::fmt;

use crate::{
    error::Result,
    models::{ItemRecord, ItemUpdate},
    transport::Api,
};

/// A line entry of a list, scoped to the list it belongs to.
#[derive(Debug, Clone)]
pub struct Item {
    list_id: String,
    record: ItemRecord,
}

impl Item {
    /// Wrap a server record belonging to `list_id`.
    pub fn new(list_id: impl Into<String>, record: ItemRecord) -> Self {
        Self {
            list_id: list_id.into(),
            record,
        }
    }

    /// Server-assigned id, unique within the owning list.
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Id of the owning list.
    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    /// Item title, also the key of the matching catalog entry.
    pub fn title(&self) -> &str {
        &self.record.title
    }

    /// Free-form amount as displayed to the user.
    pub fn amount(&self) -> &str {
        &self.record.amount
    }

    /// Raw purchase flag.
    pub fn is_purchased(&self) -> bool {
        self.record.is_purchased
    }

    /// Raw deletion flag.
    pub fn is_deleted(&self) -> bool {
        self.record.deleted
    }

    /// Whether the item is done: deleted items count as purchased.
    pub fn purchased(&self) -> bool {
        self.record.is_purchased || self.record.deleted
    }

    /// Last known server snapshot.
    pub fn record(&self) -> &ItemRecord {
        &self.record
    }

    /// Endpoint of this item.
    pub fn endpoint(&self) -> String {
        format!("lists/{}/items/{}", self.list_id, self.record.id)
    }

    /// Mark the item purchased on the server. There is no way back.
    pub fn purchase(&mut self, api: &Api) -> Result<()> {
        self.record.is_purchased = true;
        self.push(api)
    }

    /// Change the amount, leaving the purchase flag as it is.
    pub fn set_amount(&mut self, api: &Api, amount: impl Into<String>) -> Result<()> {
        self.record.amount = amount.into();
        self.push(api)
    }

    fn push(&mut self, api: &Api) -> Result<()> {
        let update = ItemUpdate {
            is_purchased: self.record.is_purchased,
            title: &self.record.title,
            amount: &self.record.amount,
        };
        self.record = api.put(&self.endpoint(), &update)?;
        Ok(())
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.list_id == other.list_id && self.record.id == other.record.id
    }
}

impl Eq for Item {}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.record.amount.is_empty() {
            write!(f, "{}", self.record.title)
        } else {
            write!(f, "{}: {}", self.record.title, self.record.amount)
        }
    }
}
