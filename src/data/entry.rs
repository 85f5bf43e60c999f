//! Dataset descriptors as they live in the registry file.
//! Entries are open-ended field maps so that fields added by an update survive
//! every later read-modify-write cycle.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

pub const NAME_FIELD: &str = "name";
pub const URL_FIELD: &str = "url";

/// One dataset's fields, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetEntry(Map<String, Value>);

impl DatasetEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(NAME_FIELD.to_string(), Value::String(name.into()));
        fields.insert(URL_FIELD.to_string(), Value::String(url.into()));
        Self(fields)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(NAME_FIELD).and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get(URL_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Overwrites or adds every field named in `patch`; other fields are left alone.
    pub fn merge(&mut self, patch: DatasetPatch) {
        for (field, value) in patch.0 {
            self.0.insert(field, value);
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for DatasetEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<NewDataset> for DatasetEntry {
    fn from(new: NewDataset) -> Self {
        Self::new(new.name, new.url)
    }
}

/// Payload of an add: the two required descriptor fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDataset {
    pub name: String,
    pub url: String,
}

impl NewDataset {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Payload of an update. Any field name is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetPatch(Map<String, Value>);

impl DatasetPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Map<String, Value>> for DatasetPatch {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionShapeError {
    #[error("entry '{0}' is not a JSON object")]
    EntryNotAnObject(String),
}

/// Every dataset in the registry, keyed by dataset name.
///
/// Deserialization only accepts a JSON object whose values are all objects, so
/// a loaded collection always upholds that shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct DatasetCollection(Map<String, Value>);

impl DatasetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<DatasetEntry> {
        self.0
            .get(name)
            .and_then(Value::as_object)
            .cloned()
            .map(DatasetEntry)
    }

    /// Inserts or replaces the entry stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, entry: DatasetEntry) {
        self.0.insert(name.into(), entry.into_value());
    }

    /// Merges `patch` into the entry under `name` and returns the result, or
    /// `None` when there is no such entry.
    pub fn merge(&mut self, name: &str, patch: DatasetPatch) -> Option<DatasetEntry> {
        let fields = self.0.get_mut(name).and_then(Value::as_object_mut)?;
        for (field, value) in patch.0 {
            fields.insert(field, value);
        }
        Some(DatasetEntry(fields.clone()))
    }
}

impl TryFrom<Map<String, Value>> for DatasetCollection {
    type Error = CollectionShapeError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        if let Some((name, _)) = raw.iter().find(|(_, value)| !value.is_object()) {
            return Err(CollectionShapeError::EntryNotAnObject(name.clone()));
        }
        Ok(Self(raw))
    }
}

impl Serialize for DatasetCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn collection_rejects_non_object_top_level() {
        assert!(serde_json::from_str::<DatasetCollection>("[1, 2]").is_err());
        assert!(serde_json::from_str::<DatasetCollection>("\"iris\"").is_err());
    }

    #[test]
    fn collection_rejects_non_object_entries() {
        let err = serde_json::from_str::<DatasetCollection>(r#"{"iris": "http://x"}"#)
            .expect_err("string entry should be rejected");
        assert!(err.to_string().contains("entry 'iris' is not a JSON object"));
    }

    #[test]
    fn collection_keeps_file_order() {
        let collection: DatasetCollection = serde_json::from_str(
            r#"{"zoo": {"name": "zoo", "url": "z"}, "iris": {"name": "iris", "url": "i"}}"#,
        )
        .expect("collection should parse");
        let names: Vec<&str> = collection.names().collect();
        assert_eq!(names, vec!["zoo", "iris"]);
    }

    #[test]
    fn merge_overwrites_named_fields_and_keeps_the_rest() {
        let mut collection = DatasetCollection::new();
        let mut entry = DatasetEntry::new("iris", "http://x");
        entry.merge(DatasetPatch::new().set("extra", "keep"));
        collection.insert("iris", entry);

        let merged = collection
            .merge("iris", DatasetPatch::new().set("url", "http://y"))
            .expect("iris should exist");

        assert_eq!(
            merged.into_value(),
            json!({"name": "iris", "url": "http://y", "extra": "keep"})
        );
        assert!(collection.merge("missing", DatasetPatch::new()).is_none());
    }

    #[test]
    fn new_dataset_becomes_name_and_url_entry() {
        let entry = DatasetEntry::from(NewDataset::new("iris", "http://x"));
        assert_eq!(entry.name(), Some("iris"));
        assert_eq!(entry.url(), Some("http://x"));
        assert_eq!(entry.fields().len(), 2);
    }
}
