//! Locator strings: CSS child-combinator paths from the document root to a node.

use scraper::ElementRef;

/// Separator between ancestor descriptors.
pub const DELIMITER: &str = " > ";

/// The slice of a DOM node the resolver and extractor need.
pub trait MarkupNode: Sized {
    /// Lowercase tag name.
    fn tag_name(&self) -> &str;

    /// Class names in attribute order.
    fn classes(&self) -> Vec<&str>;

    /// The `id` attribute, if any.
    fn id(&self) -> Option<&str>;

    /// Parent element; `None` at the outermost element.
    fn parent_node(&self) -> Option<Self>;

    /// Concatenated text of all descendants.
    fn text_content(&self) -> String;

    /// Raw attribute lookup.
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl<'a> MarkupNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn classes(&self) -> Vec<&str> {
        self.value().attr("class").map(|c| c.split_ascii_whitespace().collect()).unwrap_or_default()
    }

    fn id(&self) -> Option<&str> {
        self.value().attr("id").filter(|id| !id.trim().is_empty())
    }

    fn parent_node(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }
}

/// Builds the locator string for `node`, or an empty string for `None`.
///
/// Descriptors read `tag.class1.class2#id`, outermost ancestor first.
pub fn resolve<N: MarkupNode>(node: Option<N>) -> String {
    let mut parts = Vec::new();
    let mut current = node;

    while let Some(n) = current {
        parts.push(descriptor(&n));
        current = n.parent_node();
    }

    parts.reverse();
    parts.join(DELIMITER)
}

fn descriptor<N: MarkupNode>(node: &N) -> String {
    let mut out = node.tag_name().to_string();

    for class in node.classes() {
        out.push('.');
        out.push_str(&escape_ident(class));
    }

    if let Some(id) = node.id() {
        out.push('#');
        out.push_str(&escape_ident(id.trim()));
    }

    out
}

/// Escapes a class or id so the descriptor parses back as a CSS selector.
fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());

    for (i, c) in ident.chars().enumerate() {
        let leading_digit = c.is_ascii_digit()
            && (i == 0 || (i == 1 && ident.starts_with('-')));

        if leading_digit {
            out.push_str(&format!("\\{:x} ", c as u32));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}
