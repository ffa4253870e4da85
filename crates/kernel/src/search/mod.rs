//! Search synonyms.
//!
//! A synonym maps a search term to the words that should also match it.
//! Synonyms live in memory for the lifetime of the process.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A search term and its synonyms (comma-separated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    pub id: i64,
    pub term: String,
    pub synonym: String,
}

impl Synonym {
    /// The individual synonyms, trimmed and without empty entries.
    pub fn synonyms(&self) -> Vec<&str> {
        self.synonym
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Thread-safe synonym storage keyed by id.
#[derive(Debug, Default)]
pub struct SynonymStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    synonyms: BTreeMap<i64, Synonym>,
    last_id: i64,
}

impl SynonymStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from a JSON array of `{"term", "synonym"}` objects.
    pub fn load(path: &Path) -> Result<Self> {
        #[derive(Deserialize)]
        struct Seed {
            term: String,
            #[serde(default)]
            synonym: String,
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read synonyms from {}", path.display()))?;
        let seeds: Vec<Seed> =
            serde_json::from_str(&raw).context("synonyms file must be a JSON array")?;

        let store = Self::new();
        for seed in seeds {
            store.insert(seed.term, seed.synonym);
        }
        Ok(store)
    }

    /// Load a synonym by id.
    pub fn get(&self, id: i64) -> Option<Synonym> {
        self.inner.read().synonyms.get(&id).cloned()
    }

    /// Whether a synonym with this id exists.
    pub fn exists_by_id(&self, id: i64) -> bool {
        id > 0 && self.inner.read().synonyms.contains_key(&id)
    }

    /// Whether `term` is already used by a synonym other than `exclude_id`.
    pub fn exists_by_term(&self, term: &str, exclude_id: Option<i64>) -> bool {
        self.inner
            .read()
            .synonyms
            .values()
            .any(|s| s.term == term && Some(s.id) != exclude_id)
    }

    /// Add a synonym, returning its id.
    pub fn insert(&self, term: impl Into<String>, synonym: impl Into<String>) -> i64 {
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let id = inner.last_id;
        let record = Synonym {
            id,
            term: term.into(),
            synonym: synonym.into(),
        };
        debug!(id, term = %record.term, "synonym inserted");
        inner.synonyms.insert(id, record);
        id
    }

    /// Replace an existing synonym. Returns false if the id is unknown.
    pub fn update(&self, synonym: Synonym) -> bool {
        let mut inner = self.inner.write();
        match inner.synonyms.get_mut(&synonym.id) {
            Some(existing) => {
                debug!(id = synonym.id, term = %synonym.term, "synonym updated");
                *existing = synonym;
                true
            }
            None => false,
        }
    }

    /// All synonyms ordered by term.
    pub fn list(&self) -> Vec<Synonym> {
        let mut all: Vec<_> = self.inner.read().synonyms.values().cloned().collect();
        all.sort_by(|a, b| a.term.cmp(&b.term).then(a.id.cmp(&b.id)));
        all
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let store = SynonymStore::new();
        let id = store.insert("cms", "content management, site builder");
        assert_eq!(id, 1);
        let synonym = store.get(id).unwrap();
        assert_eq!(synonym.term, "cms");
        assert_eq!(synonym.synonyms(), ["content management", "site builder"]);
        assert!(store.exists_by_id(id));
        assert!(!store.exists_by_id(0));
        assert!(!store.exists_by_id(42));
    }

    #[test]
    fn test_exists_by_term_excludes_own_id() {
        let store = SynonymStore::new();
        let cms = store.insert("cms", "content management");
        let blog = store.insert("blog", "weblog");

        assert!(store.exists_by_term("cms", None));
        assert!(!store.exists_by_term("cms", Some(cms)));
        assert!(store.exists_by_term("cms", Some(blog)));
        assert!(!store.exists_by_term("wiki", None));
    }

    #[test]
    fn test_update() {
        let store = SynonymStore::new();
        let id = store.insert("cms", "content management");
        assert!(store.update(Synonym {
            id,
            term: "CMS".to_string(),
            synonym: "site builder".to_string(),
        }));
        assert_eq!(store.get(id).unwrap().term, "CMS");

        assert!(!store.update(Synonym {
            id: 99,
            term: "x".to_string(),
            synonym: "y".to_string(),
        }));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synonyms.json");
        std::fs::write(
            &path,
            r#"[{"term": "cms", "synonym": "content management"}, {"term": "blog"}]"#,
        )
        .unwrap();

        let store = SynonymStore::load(&path).unwrap();
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.get(1).unwrap().synonym, "content management");
        assert_eq!(store.get(2).unwrap().synonym, "");

        std::fs::write(&path, "{}").unwrap();
        assert!(SynonymStore::load(&path).is_err());
        assert!(SynonymStore::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_list_is_sorted_by_term() {
        let store = SynonymStore::new();
        store.insert("wiki", "");
        store.insert("blog", "");
        store.insert("cms", "");
        let terms: Vec<_> = store.list().into_iter().map(|s| s.term).collect();
        assert_eq!(terms, ["blog", "cms", "wiki"]);
    }
}
