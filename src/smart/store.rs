//! Persistent per-field locator store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, error, warn};

/// Product fields the store keeps locators for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Price,
    Title,
    Model,
    Brand,
    Availability,
}

impl Field {
    /// Every field, in storage order.
    pub const ALL: [Field; 5] =
        [Field::Price, Field::Title, Field::Model, Field::Brand, Field::Availability];

    /// Key used in the pattern file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Price => "price",
            Field::Title => "title",
            Field::Model => "model",
            Field::Brand => "brand",
            Field::Availability => "availability",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown field: {}. Use: price, title, model, brand, availability", s))
    }
}

/// Known locators per field, in discovery order.
///
/// On disk this is a JSON object with exactly the five field keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStore {
    #[serde(default)]
    pub price: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub model: Vec<String>,
    #[serde(default)]
    pub brand: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
}

impl PatternStore {
    /// Creates a store with no locators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store from `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            debug!("No pattern file at {}, starting empty", path.display());
            return Self::default();
        }

        match Self::read_from(path) {
            Ok(mut store) => {
                store.dedupe();
                debug!("Loaded {} locators from {}", store.len(), path.display());
                store
            }
            Err(e) => {
                warn!("Failed to load patterns, starting empty: {:#}", e);
                Self::default()
            }
        }
    }

    /// Reads and parses the pattern file.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse pattern file: {}", path.display()))
    }

    /// Persists the store, logging instead of failing.
    ///
    /// Returns whether the file was written.
    pub fn save(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.write_to(path) {
            Ok(()) => {
                debug!("Saved {} locators to {}", self.len(), path.display());
                true
            }
            Err(e) => {
                error!("Failed to save patterns: {:#}", e);
                false
            }
        }
    }

    /// Writes the store as pretty JSON, creating parent directories.
    ///
    /// The file is replaced atomically via a sibling temp file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize patterns")?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write pattern file: {}", path.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace pattern file: {}", path.display()))
    }

    /// Locators for a field.
    pub fn get(&self, field: Field) -> &[String] {
        match field {
            Field::Price => &self.price,
            Field::Title => &self.title,
            Field::Model => &self.model,
            Field::Brand => &self.brand,
            Field::Availability => &self.availability,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut Vec<String> {
        match field {
            Field::Price => &mut self.price,
            Field::Title => &mut self.title,
            Field::Model => &mut self.model,
            Field::Brand => &mut self.brand,
            Field::Availability => &mut self.availability,
        }
    }

    /// Whether `locator` is already known for `field`.
    pub fn contains(&self, field: Field, locator: &str) -> bool {
        self.get(field).iter().any(|l| l == locator)
    }

    /// Appends a locator unless already present. Returns whether it was added.
    pub fn insert(&mut self, field: Field, locator: impl Into<String>) -> bool {
        let locator = locator.into();
        if locator.is_empty() || self.contains(field, &locator) {
            return false;
        }
        self.get_mut(field).push(locator);
        true
    }

    /// Merges candidates, then dedupes every field.
    ///
    /// Keeps first-occurrence order. Returns the number of locators added.
    pub fn merge(&mut self, candidates: &Candidates) -> usize {
        let mut added = 0;
        for (field, locators) in candidates.iter() {
            for locator in locators {
                if self.insert(field, locator.as_str()) {
                    added += 1;
                }
            }
        }
        self.dedupe();
        added
    }

    /// Drops repeated locators within each field, keeping the first.
    pub fn dedupe(&mut self) {
        for field in Field::ALL {
            let mut seen = HashSet::new();
            self.get_mut(field).retain(|l| seen.insert(l.clone()));
        }
    }

    /// Total locators across all fields.
    pub fn len(&self) -> usize {
        Field::ALL.iter().map(|f| self.get(*f).len()).sum()
    }

    /// Returns true if no field has locators.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Locators proposed by one discovery pass, not yet stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidates {
    by_field: BTreeMap<Field, Vec<String>>,
}

impl Candidates {
    /// Creates an empty candidate set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a candidate unless it is empty or already proposed.
    pub fn push(&mut self, field: Field, locator: String) -> bool {
        if locator.is_empty() {
            return false;
        }
        let entry = self.by_field.entry(field).or_default();
        if entry.contains(&locator) {
            return false;
        }
        entry.push(locator);
        true
    }

    /// Candidates for one field.
    pub fn get(&self, field: Field) -> &[String] {
        self.by_field.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates fields that have candidates.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &Vec<String>)> {
        self.by_field.iter().filter(|(_, v)| !v.is_empty()).map(|(f, v)| (*f, v))
    }

    /// Keeps only the candidates `keep` accepts.
    pub fn retain(&mut self, mut keep: impl FnMut(Field, &str) -> bool) {
        for (field, locators) in self.by_field.iter_mut() {
            locators.retain(|l| keep(*field, l));
        }
        self.by_field.retain(|_, v| !v.is_empty());
    }

    /// Total candidates across fields.
    pub fn len(&self) -> usize {
        self.by_field.values().map(Vec::len).sum()
    }

    /// Returns true if nothing was proposed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn candidates(pairs: &[(Field, &str)]) -> Candidates {
        let mut c = Candidates::new();
        for (field, locator) in pairs {
            c.push(*field, locator.to_string());
        }
        c
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("price".parse::<Field>().unwrap(), Field::Price);
        assert_eq!("Availability".parse::<Field>().unwrap(), Field::Availability);
        assert!("rating".parse::<Field>().unwrap_err().contains("Unknown field"));
        assert_eq!(Field::Brand.to_string(), "brand");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let store = PatternStore::load("/nonexistent/dir/patterns.json");
        assert!(store.is_empty());
        for field in Field::ALL {
            assert!(store.get(field).is_empty());
        }
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();

        let store = PatternStore::load(file.path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"price": ["span.price", "span.price"], "extra": [1]}}"#).unwrap();

        let store = PatternStore::load(file.path());
        assert_eq!(store.price, vec!["span.price"]);
        assert!(store.title.is_empty());
    }

    #[test]
    fn test_save_creates_directories_and_roundtrips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data").join("patterns.json");

        let mut store = PatternStore::new();
        store.insert(Field::Price, "html > body > span.price");
        store.insert(Field::Title, "html > body > h1");
        store.insert(Field::Availability, "html > body > p.stock");

        assert!(store.save(&path));
        assert_eq!(PatternStore::load(&path), store);
        // Loading twice gives the same order
        assert_eq!(PatternStore::load(&path), PatternStore::load(&path));
    }

    #[test]
    fn test_saved_file_has_all_five_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patterns.json");
        PatternStore::new().save(&path);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for field in Field::ALL {
            assert!(obj[field.as_str()].as_array().unwrap().is_empty());
        }
    }

    #[test]
    fn test_save_failure_is_reported_not_raised() {
        let file = NamedTempFile::new().unwrap();
        // A regular file cannot be used as a directory
        let path = file.path().join("patterns.json");
        assert!(!PatternStore::new().save(&path));
        assert!(PatternStore::new().write_to(&path).is_err());
    }

    #[test]
    fn test_merge_appends_new_locators() {
        let mut store = PatternStore::new();
        store.insert(Field::Price, "a");

        let added = store.merge(&candidates(&[(Field::Price, "a"), (Field::Price, "b"), (Field::Model, "m")]));
        assert_eq!(added, 2);
        assert_eq!(store.price, vec!["a", "b"]);
        assert_eq!(store.model, vec!["m"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let c = candidates(&[(Field::Title, "h1"), (Field::Brand, "p.brand")]);

        let mut once = PatternStore::new();
        once.merge(&c);

        let mut twice = PatternStore::new();
        twice.merge(&c);
        assert_eq!(twice.merge(&c), 0);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_dedupes_existing_duplicates() {
        let mut store = PatternStore {
            title: vec!["x".into(), "y".into(), "x".into()],
            ..Default::default()
        };
        store.merge(&Candidates::new());
        assert_eq!(store.title, vec!["x", "y"]);
    }

    #[test]
    fn test_insert_rejects_empty_and_duplicates() {
        let mut store = PatternStore::new();
        assert!(!store.insert(Field::Price, ""));
        assert!(store.insert(Field::Price, "p"));
        assert!(!store.insert(Field::Price, "p"));
        assert!(store.contains(Field::Price, "p"));
        assert!(!store.contains(Field::Title, "p"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_candidates_push_and_retain() {
        let mut c = Candidates::new();
        assert!(c.push(Field::Price, "a".into()));
        assert!(!c.push(Field::Price, "a".into()));
        assert!(!c.push(Field::Price, String::new()));
        assert!(c.push(Field::Title, "t".into()));
        assert_eq!(c.len(), 2);

        c.retain(|field, _| field == Field::Title);
        assert_eq!(c.len(), 1);
        assert!(c.get(Field::Price).is_empty());
        assert_eq!(c.iter().count(), 1);
    }
}
