//! smart-parser - store scraper with a self-learning selector fallback
//!
//! Store parsers run their own CSS selectors first. Locators learned from
//! pages those selectors could read take over when a redesign breaks them.

pub mod commands;
pub mod config;
pub mod format;
pub mod lugi;
pub mod smart;

pub use config::Config;
pub use lugi::{Price, Product, SearchHit};
pub use smart::{ExtractionResult, Field, PatternStore, SmartParser, Source};
