use std::collections::HashMap;

use tracing::info;

use crate::{
    entities::{unique_item::unique_item_endpoint, UniqueItem},
    error::Result,
    models::{NewUniqueItem, UniqueItemRecord},
    transport::Api,
};

/// Account-wide unique items with a name index built alongside.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<UniqueItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Fetch the whole catalog.
    pub fn fetch(api: &Api) -> Result<Self> {
        let records: Vec<UniqueItemRecord> = api.get("unique_items")?;
        Ok(Self::from_items(
            records.into_iter().map(UniqueItem::new).collect(),
        ))
    }

    /// Build a catalog. When titles repeat, the later entry wins the index.
    pub fn from_items(items: Vec<UniqueItem>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.name().to_string(), position))
            .collect();
        Self { items, index }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in server order.
    pub fn items(&self) -> &[UniqueItem] {
        &self.items
    }

    /// Iterate entries in server order.
    pub fn iter(&self) -> impl Iterator<Item = &UniqueItem> {
        self.items.iter()
    }

    /// Entry called `name`.
    pub fn get(&self, name: &str) -> Option<&UniqueItem> {
        self.index.get(name).and_then(|&position| self.items.get(position))
    }

    /// Entry called `name`, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut UniqueItem> {
        let position = *self.index.get(name)?;
        self.items.get_mut(position)
    }

    /// Add or replace the entry with the same title.
    pub fn insert(&mut self, item: UniqueItem) -> &mut UniqueItem {
        let position = self.insert_position(item);
        &mut self.items[position]
    }

    fn insert_position(&mut self, item: UniqueItem) -> usize {
        match self.index.get(item.name()) {
            Some(&position) => {
                self.items[position] = item;
                position
            }
            None => {
                self.index.insert(item.name().to_string(), self.items.len());
                self.items.push(item);
                self.items.len() - 1
            }
        }
    }

    /// Entry called `name`, created on the server with one use if missing.
    /// Repeated calls never create duplicates.
    ///
    /// When the server answers with a title that is already indexed, the
    /// existing entry is kept and `name` becomes an alias for it.
    pub fn get_or_create(
        &mut self,
        api: &Api,
        name: &str,
        group_id: i64,
    ) -> Result<&mut UniqueItem> {
        if let Some(&position) = self.index.get(name) {
            return Ok(&mut self.items[position]);
        }

        let body = NewUniqueItem {
            group_id,
            permanent: None,
            use_count: 1,
        };
        let record: UniqueItemRecord = api.put(&unique_item_endpoint(name), &body)?;
        info!("created unique item {} in group {}", name, group_id);
        let existing = self.index.get(&record.title).copied();
        let position = match existing {
            Some(position) => position,
            None => self.insert_position(UniqueItem::new(record)),
        };
        // the server may normalise the title; keep the requested name resolvable
        self.index.insert(name.to_string(), position);
        Ok(&mut self.items[position])
    }

    /// Case-insensitive substring search over titles.
    pub fn matching(&self, query: &str) -> Vec<&UniqueItem> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.name().to_lowercase().contains(&needle))
            .collect()
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

    fn entry(title: &str, use_count: u64) -> UniqueItem {
        UniqueItem::new(UniqueItemRecord {
            title: title.to_string(),
            use_count,
            last_use: None,
            group_id: 0,
            amount: None,
            permanent: false,
        })
    }

    #[test]
    fn index_matches_items() {
        let catalog = Catalog::from_items(vec![entry("Milk", 1), entry("Bread", 2)]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Bread").map(UniqueItem::use_count), Some(2));
        assert!(catalog.get("bread").is_none());
    }

    #[test]
    fn later_duplicates_win_the_index() {
        let catalog = Catalog::from_items(vec![entry("Milk", 1), entry("Milk", 5)]);
        assert_eq!(catalog.get("Milk").map(UniqueItem::use_count), Some(5));
    }

    #[test]
    fn insert_replaces_same_title() {
        let mut catalog = Catalog::from_items(vec![entry("Milk", 1)]);
        catalog.insert(entry("Milk", 3));
        catalog.insert(entry("Tea", 1));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Milk").map(UniqueItem::use_count), Some(3));
        assert_eq!(catalog.items()[1].name(), "Tea");
    }

    #[test]
    fn get_or_create_is_idempotent() -> Result<()> {
        let transport = MockTransport::new();
        transport.respond_json(
            Method::PUT,
            "unique_items/Eggs",
            json!({"title": "Eggs", "use_count": 1, "group_id": 4}),
        );
        let api = Api::new(BASE_URL, transport.clone());
        let mut catalog = Catalog::default();

        let first = catalog.get_or_create(&api, "Eggs", 4)?.clone();
        let second = catalog.get_or_create(&api, "Eggs", 4)?.clone();

        assert_eq!(first, second);
        assert_eq!(catalog.len(), 1);
        assert_eq!(transport.count(Method::PUT, "unique_items/Eggs"), 1);
        assert_eq!(
            transport.last_body(Method::PUT, "unique_items/Eggs"),
            Some(json!({"group_id": 4, "use_count": 1}))
        );
        Ok(())
    }

    #[test]
    fn renamed_answers_stay_reachable_by_requested_name() -> Result<()> {
        let transport = MockTransport::new();
        transport.respond_json(
            Method::PUT,
            "unique_items/eggs",
            json!({"title": "Eggs", "use_count": 1}),
        );
        let api = Api::new(BASE_URL, transport.clone());
        let mut catalog = Catalog::default();

        catalog.get_or_create(&api, "eggs", 0)?;
        catalog.get_or_create(&api, "eggs", 0)?;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Eggs").map(UniqueItem::name), Some("Eggs"));
        assert_eq!(transport.count(Method::PUT, "unique_items/eggs"), 1);
        Ok(())
    }

    #[test]
    fn normalised_titles_keep_the_existing_entry() -> Result<()> {
        let transport = MockTransport::new();
        transport.respond_json(
            Method::PUT,
            "unique_items/eggs",
            json!({"title": "Eggs", "use_count": 1}),
        );
        let api = Api::new(BASE_URL, transport.clone());
        let mut catalog = Catalog::from_items(vec![entry("Eggs", 9)]);

        let eggs = catalog.get_or_create(&api, "eggs", 0)?;
        assert_eq!(eggs.name(), "Eggs");
        assert_eq!(eggs.use_count(), 9);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("eggs").map(UniqueItem::use_count), Some(9));
        Ok(())
    }

    #[test]
    fn existing_entries_are_not_recreated() -> Result<()> {
        let transport = MockTransport::new();
        let api = Api::new(BASE_URL, transport.clone());
        let mut catalog = Catalog::from_items(vec![entry("Milk", 7)]);

        assert_eq!(catalog.get_or_create(&api, "Milk", 0)?.use_count(), 7);
        assert!(transport.requests().is_empty());
        Ok(())
    }

    #[test]
    fn matching_is_case_insensitive() {
        let catalog =
            Catalog::from_items(vec![entry("Oat milk", 1), entry("Bread", 1), entry("MILK", 1)]);
        let names: Vec<_> = catalog.matching(" Milk ").into_iter().map(UniqueItem::name).collect();
        assert_eq!(names, vec!["Oat milk", "MILK"]);
        assert_eq!(catalog.matching("").len(), 3);
    }
}
