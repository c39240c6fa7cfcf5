//! LUGI store modules for HTTP client, parsing, and data models.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use client::{LugiClient, PageSource};
pub use models::{Price, Product, SearchHit};
pub use parser::{parse_search, Parser, StandardPage};
