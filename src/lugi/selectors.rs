//! CSS selectors for LUGI HTML parsing.
//!
//! These are the store's hard-coded selectors. When they stop matching after
//! a redesign, the learned pattern store takes over until this file is updated.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for search results pages.
pub mod search {
    use super::*;

    /// Product card container.
    pub static CARD: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".product-layout").unwrap());

    /// Link wrapped around the card image.
    pub static IMAGE_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".image a[href]").unwrap());

    /// Link in the card title.
    pub static NAME_LINK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".product-name a[href]").unwrap());

    /// Card title.
    pub static NAME: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".product-name").unwrap());

    /// Card price.
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".price").unwrap());
}

/// Selectors for product pages.
pub mod product {
    use super::*;

    /// Product title, tried in order.
    pub static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        [
            "h1.product-name",
            "h1.product-title",
            "h1.name",
            "h1[itemprop='name']",
            ".product-name h1",
            "#product h1",
        ]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
    });

    /// Price recalculated by the options widget.
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".autocalc-product-price").unwrap());

    /// Description tab.
    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#tab-description").unwrap());

    /// Main product image.
    pub static MAIN_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".image a img").unwrap());

    /// Gallery thumbnails.
    pub static ADDITIONAL_IMAGES: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".additional-images img").unwrap());

    /// Image attributes, preferred first.
    pub const IMAGE_ATTRS: [&str; 2] = ["data-additional-hover", "src"];

    /// Specification table rows.
    pub static SPEC_ROWS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#tab-specification tr").unwrap());

    /// Cells within a specification row.
    pub static SPEC_CELLS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

    /// Stock status label.
    pub static STOCK_STATUS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".stock-status").unwrap());

    /// "Buy" button; carries a `disabled` class when sold out.
    pub static BUY_BUTTON: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("#button-cart").unwrap());
}
