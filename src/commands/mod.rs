//! CLI command implementations.

pub mod patterns;
pub mod product;
pub mod search;

pub use patterns::PatternsCommand;
pub use product::ProductCommand;
pub use search::SearchCommand;
