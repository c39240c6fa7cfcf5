//! Self-learning selector fallback.
//!
//! A store parser first runs its own hard-coded selectors. When those come up
//! empty, [`SmartParser::resolve`] falls back to locators learned from earlier
//! pages; when they succeed, the page is mined for new locators so the
//! fallback keeps up with markup changes.

pub mod discover;
pub mod extract;
pub mod labels;
pub mod locator;
pub mod store;
pub mod validate;

pub use discover::Discoverer;
pub use extract::{ExtractionResult, Extractor, FieldValue};
pub use labels::{LabelConfig, LabelPatterns};
pub use locator::{resolve as resolve_locator, MarkupNode};
pub use store::{Candidates, Field, PatternStore};
pub use validate::{check, validate, ValidationError};

use crate::config::Config;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Where the fields of a resolved page came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The store parser's own selectors.
    Standard,
    /// Locators from the pattern store.
    Learned,
    /// Neither produced usable data.
    #[default]
    None,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Standard => write!(f, "standard"),
            Source::Learned => write!(f, "learned"),
            Source::None => write!(f, "none"),
        }
    }
}

/// Outcome of [`SmartParser::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub fields: ExtractionResult,
    pub source: Source,
}

/// Pattern store plus the discovery, extraction and learning built on it.
///
/// Reads share a lock; a learning cycle holds the write lock through merge
/// and save, so one store never sees two cycles at once.
pub struct SmartParser {
    path: PathBuf,
    store: RwLock<PatternStore>,
    patterns: LabelPatterns,
    learning: bool,
    verify_learned: bool,
}

impl SmartParser {
    /// Creates a parser backed by the pattern file named in `config`.
    pub fn new(config: &Config) -> Self {
        let store = PatternStore::load(&config.patterns_path);
        Self::with_store(store, &config.patterns_path, config.labels.compile())
            .learning(config.learning)
            .verify_learned(config.verify_learned)
    }

    /// Creates a parser over an existing store.
    pub fn with_store(store: PatternStore, path: impl Into<PathBuf>, patterns: LabelPatterns) -> Self {
        Self {
            path: path.into(),
            store: RwLock::new(store),
            patterns,
            learning: true,
            verify_learned: false,
        }
    }

    /// Enables or disables learning from standard parses.
    pub fn learning(mut self, enabled: bool) -> Self {
        self.learning = enabled;
        self
    }

    /// Only learn locators that reproduce the confirmed values.
    pub fn verify_learned(mut self, enabled: bool) -> Self {
        self.verify_learned = enabled;
        self
    }

    /// Pattern file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compiled label matchers.
    pub fn label_patterns(&self) -> &LabelPatterns {
        &self.patterns
    }

    /// Copy of the current store.
    pub fn snapshot(&self) -> PatternStore {
        self.read().clone()
    }

    /// Locators in `document` the store does not know yet.
    pub fn discover(&self, document: &Html) -> Candidates {
        Discoverer::new(&self.patterns).discover(document, &self.read())
    }

    /// Extracts fields through stored locators.
    pub fn extract(&self, document: &Html) -> ExtractionResult {
        Extractor::new(&self.patterns).extract(document, &self.read())
    }

    /// Returns true if every present field passes its rule.
    pub fn validate(&self, result: &ExtractionResult) -> bool {
        validate(result)
    }

    /// Runs one learning cycle: discover, merge, save.
    ///
    /// `confirmed` is what the standard parse found on the same page. It is
    /// only consulted when `verify_learned` is on. Returns the locators that
    /// were added.
    pub fn learn(&self, document: &Html, confirmed: &ExtractionResult) -> Candidates {
        let mut store = self.write();

        let mut candidates = Discoverer::new(&self.patterns).discover(document, &store);

        if self.verify_learned {
            let extractor = Extractor::new(&self.patterns);
            candidates.retain(|field, locator| match confirmed.value(field) {
                Some(expected) => {
                    let agrees = extractor
                        .extract_with(document, field, locator)
                        .is_some_and(|found| values_agree(&found, &expected));
                    if !agrees {
                        debug!("Rejecting {} locator that disagrees with page: {}", field, locator);
                    }
                    agrees
                }
                None => true,
            });
        }

        let added = store.merge(&candidates);
        store.save(&self.path);

        if added > 0 {
            info!("Learned {} new locators ({} total)", added, store.len());
        } else {
            debug!("No new locators learned");
        }

        candidates
    }

    /// Standard-then-fallback control flow shared by store parsers.
    ///
    /// A non-empty `standard` result is returned as is and, with learning on,
    /// the page is mined for locators. Otherwise the stored locators are tried
    /// and their result is kept only if it validates.
    pub fn resolve(&self, document: &Html, standard: ExtractionResult) -> Resolution {
        let usable = !standard.is_empty();
        self.resolve_with(document, standard, usable)
    }

    /// Like [`resolve`](Self::resolve), with the caller deciding whether the
    /// standard parse produced usable data.
    pub fn resolve_with(
        &self,
        document: &Html,
        standard: ExtractionResult,
        standard_ok: bool,
    ) -> Resolution {
        if standard_ok {
            if self.learning {
                self.learn(document, &standard);
            }
            return Resolution { fields: standard, source: Source::Standard };
        }

        let fallback = self.extract(document);
        if fallback.is_empty() {
            debug!("Fallback extraction found nothing");
            return Resolution::default();
        }

        let errors = check(&fallback);
        if errors.is_empty() {
            debug!("Using learned locators for {:?}", fallback.present_fields());
            Resolution { fields: fallback, source: Source::Learned }
        } else {
            for e in &errors {
                debug!("Discarding fallback extraction: {}", e);
            }
            Resolution::default()
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PatternStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PatternStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn values_agree(found: &FieldValue, expected: &FieldValue) -> bool {
    match (found, expected) {
        (FieldValue::Number(a), FieldValue::Number(b)) => (a - b).abs() < 0.005,
        (FieldValue::Text(a), FieldValue::Text(b)) => a.trim() == b.trim(),
        (FieldValue::Flag(a), FieldValue::Flag(b)) => a == b,
        _ => false,
    }
}
