//! Locator discovery: mines a document for nodes that look like product fields.

use crate::smart::labels::LabelPatterns;
use crate::smart::locator::resolve;
use crate::smart::store::{Candidates, Field, PatternStore};
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{trace, warn};

/// Elements whose text never describes the product.
const SKIPPED_PARENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Proposes locators for each field from label and tag heuristics.
pub struct Discoverer<'p> {
    patterns: &'p LabelPatterns,
}

impl<'p> Discoverer<'p> {
    /// Creates a discoverer using the given label matchers.
    pub fn new(patterns: &'p LabelPatterns) -> Self {
        Self { patterns }
    }

    /// Returns locators found in `document` that `store` does not know yet.
    pub fn discover(&self, document: &Html, store: &PatternStore) -> Candidates {
        let mut candidates = Candidates::new();

        self.discover_text_fields(document, store, &mut candidates);
        self.discover_titles(document, store, &mut candidates);

        trace!("Discovered {} candidate locators", candidates.len());
        candidates
    }

    fn discover_text_fields(&self, document: &Html, store: &PatternStore, out: &mut Candidates) {
        let matchers: [(Field, Option<&Regex>); 4] = [
            (Field::Price, self.patterns.price.as_ref()),
            (Field::Model, self.patterns.model.as_ref()),
            (Field::Brand, self.patterns.brand.as_ref()),
            (Field::Availability, self.patterns.availability.as_ref()),
        ];

        for node in document.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
                continue;
            };
            if SKIPPED_PARENTS.contains(&parent.value().name()) {
                continue;
            }

            let text: &str = text;
            let mut resolved = None;

            for (field, re) in matchers.iter() {
                let Some(re) = re else { continue };
                if !re.is_match(text) {
                    continue;
                }

                let locator = resolved.get_or_insert_with(|| resolve(Some(parent)));
                if !store.contains(*field, locator) {
                    out.push(*field, locator.clone());
                }
            }
        }
    }

    fn discover_titles(&self, document: &Html, store: &PatternStore, out: &mut Candidates) {
        let selector = match Selector::parse(&self.patterns.title_selector) {
            Ok(s) => s,
            Err(_) => {
                warn!("Invalid title selector: {}", self.patterns.title_selector);
                return;
            }
        };

        for element in document.select(&selector) {
            let locator = resolve(Some(element));
            if !store.contains(Field::Title, &locator) {
                out.push(Field::Title, locator);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart::labels::LabelConfig;

    const PAGE: &str = r#"
        <html><body>
            <div id="main">
                <h1 class="product-name">Widget X</h1>
                <span class="price">1299 грн</span>
                <p class="sku">Артикул: WX-100</p>
                <p class="maker">Бренд: Acme</p>
                <p class="stock">В наявності</p>
            </div>
            <script>var price = "999 грн";</script>
        </body></html>
    "#;

    #[test]
    fn test_discovers_every_field() {
        let patterns = LabelPatterns::default();
        let doc = Html::parse_document(PAGE);
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());

        assert_eq!(found.get(Field::Price), ["html > body > div#main > span.price"]);
        assert_eq!(found.get(Field::Title), ["html > body > div#main > h1.product-name"]);
        assert_eq!(found.get(Field::Model), ["html > body > div#main > p.sku"]);
        assert_eq!(found.get(Field::Brand), ["html > body > div#main > p.maker"]);
        assert_eq!(found.get(Field::Availability), ["html > body > div#main > p.stock"]);
    }

    #[test]
    fn test_script_text_is_ignored() {
        let patterns = LabelPatterns::default();
        let doc = Html::parse_document(PAGE);
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());

        assert!(found.get(Field::Price).iter().all(|l| !l.contains("script")));
    }

    #[test]
    fn test_known_locators_are_not_proposed() {
        let patterns = LabelPatterns::default();
        let doc = Html::parse_document(PAGE);

        let mut store = PatternStore::new();
        store.insert(Field::Price, "html > body > div#main > span.price");

        let found = Discoverer::new(&patterns).discover(&doc, &store);
        assert!(found.get(Field::Price).is_empty());
        assert_eq!(found.get(Field::Title).len(), 1);
    }

    #[test]
    fn test_repeated_structure_yields_one_candidate() {
        let patterns = LabelPatterns::default();
        let doc = Html::parse_document(
            r#"<ul><li class="p">10 грн</li><li class="p">20 грн</li><li class="p">30 ₴</li></ul>"#,
        );
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());
        assert_eq!(found.get(Field::Price), ["html > body > ul > li.p"]);
    }

    #[test]
    fn test_headings_are_title_candidates() {
        let patterns = LabelPatterns::default();
        let doc = Html::parse_document("<h1>Main</h1><section><h2>Sub</h2></section><h3>No</h3>");
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());
        assert_eq!(found.get(Field::Title), ["html > body > h1", "html > body > section > h2"]);
    }

    #[test]
    fn test_lowercase_label_is_not_matched() {
        let patterns = LabelPatterns::default();
        let doc = Html::parse_document(r#"<p class="m">модель: X1</p>"#);
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());
        assert!(found.get(Field::Model).is_empty());
    }

    #[test]
    fn test_document_without_matches() {
        let patterns = LabelPatterns::default();
        let doc = Html::parse_document("<<<not really html");
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());
        assert!(found.is_empty());
    }

    #[test]
    fn test_english_labels() {
        let patterns = LabelConfig::english().compile();
        let doc = Html::parse_document(
            r#"<div class="spec"><span>SKU: AB-9</span><em>In stock</em><b>12 USD</b></div>"#,
        );
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());
        assert_eq!(found.get(Field::Model), ["html > body > div.spec > span"]);
        assert_eq!(found.get(Field::Availability), ["html > body > div.spec > em"]);
        assert_eq!(found.get(Field::Price), ["html > body > div.spec > b"]);
    }

    #[test]
    fn test_invalid_title_selector_is_tolerated() {
        let labels = LabelConfig { title_selector: "h1[[".into(), ..LabelConfig::default() };
        let patterns = labels.compile();
        let doc = Html::parse_document("<h1>Title</h1>");
        let found = Discoverer::new(&patterns).discover(&doc, &PatternStore::new());
        assert!(found.get(Field::Title).is_empty());
    }
}
