use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
    error::Result,
    models::{to_datetime, UniqueItemRecord, UniqueItemUpdate},
    palette,
    transport::Api,
};

/// Account-wide catalog entry, keyed by title.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueItem {
    record: UniqueItemRecord,
}

impl UniqueItem {
    /// Wrap a server record.
    pub fn new(record: UniqueItemRecord) -> Self {
        Self { record }
    }

    /// Title; the identity of the entry.
    pub fn name(&self) -> &str {
        &self.record.title
    }

    /// How many times the title has been added to a list.
    pub fn use_count(&self) -> u64 {
        self.record.use_count
    }

    /// Time of the last use, when known.
    pub fn last_use(&self) -> Option<DateTime<Utc>> {
        self.record.last_use.and_then(to_datetime)
    }

    /// Product group, used for coloring.
    pub fn group_id(&self) -> i64 {
        self.record.group_id
    }

    /// Default amount suggested by the server.
    pub fn amount(&self) -> Option<&str> {
        self.record.amount.as_deref()
    }

    /// Whether the entry survives catalog cleanups.
    pub fn is_permanent(&self) -> bool {
        self.record.permanent
    }

    /// Hex color of the product group.
    pub fn color(&self) -> &'static str {
        palette::color(self.record.group_id)
    }

    /// Last known server snapshot.
    pub fn record(&self) -> &UniqueItemRecord {
        &self.record
    }

    /// Endpoint of this entry.
    pub fn endpoint(&self) -> String {
        unique_item_endpoint(&self.record.title)
    }

    /// Count one more use and push it. The local count stays incremented
    /// even when the push fails.
    pub fn update_use(&mut self, api: &Api) -> Result<()> {
        self.record.use_count += 1;
        self.push(api)
    }

    /// Move the entry to another product group.
    pub fn set_group(&mut self, api: &Api, group_id: i64) -> Result<()> {
        self.record.group_id = group_id;
        self.push(api)
    }

    fn push(&self, api: &Api) -> Result<()> {
        let update = UniqueItemUpdate {
            use_count: self.record.use_count,
            permanent: self.record.permanent,
            group_id: self.record.group_id,
        };
        api.put_ignoring_answer(&self.endpoint(), Some(&update))?;
        Ok(())
    }
}

pub(crate) fn unique_item_endpoint(name: &str) -> String {
    format!("unique_items/{name}")
}

impl fmt::Display for UniqueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.record.title, self.record.group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{
        mock::{MockTransport, BASE_URL},
        Method,
    };
    use serde_json::json;

    fn eggs() -> UniqueItem {
        UniqueItem::new(UniqueItemRecord {
            title: "Eggs".to_string(),
            use_count: 4,
            last_use: Some(1_600_000_000),
            group_id: 31,
            amount: None,
            permanent: true,
        })
    }

    #[test]
    fn update_use_increments_and_pushes() -> Result<()> {
        let transport = MockTransport::new();
        transport.respond_json(Method::PUT, "unique_items/Eggs", json!({}));
        let api = Api::new(BASE_URL, transport.clone());

        let mut item = eggs();
        item.update_use(&api)?;

        assert_eq!(item.use_count(), 5);
        assert_eq!(
            transport.last_body(Method::PUT, "unique_items/Eggs"),
            Some(json!({"use_count": 5, "permanent": true, "group_id": 31}))
        );
        Ok(())
    }

    #[test]
    fn failed_push_keeps_local_increment() {
        let transport = MockTransport::new();
        transport.respond(Method::PUT, "unique_items/Eggs", 500, "Internal Server Error");
        let api = Api::new(BASE_URL, transport);

        let mut item = eggs();
        assert!(item.update_use(&api).is_err());
        assert_eq!(item.use_count(), 5);
    }

    #[test]
    fn set_group_pushes_new_group() -> Result<()> {
        let transport = MockTransport::new();
        transport.respond_json(Method::PUT, "unique_items/Eggs", json!({}));
        let api = Api::new(BASE_URL, transport.clone());

        let mut item = eggs();
        item.set_group(&api, 5)?;
        assert_eq!(item.group_id(), 5);
        assert_eq!(item.color(), palette::GROUP_COLORS[5]);
        assert_eq!(
            transport.last_body(Method::PUT, "unique_items/Eggs"),
            Some(json!({"use_count": 4, "permanent": true, "group_id": 5}))
        );
        Ok(())
    }

    #[test]
    fn out_of_range_group_uses_default_color() {
        let item = eggs();
        assert_eq!(item.color(), palette::color(0));
        assert_eq!(item.to_string(), "Eggs (31)");
        assert_eq!(item.last_use().map(|dt| dt.timestamp()), Some(1_600_000_000));
    }
}
