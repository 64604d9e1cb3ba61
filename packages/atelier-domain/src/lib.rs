//! Pure catalog heuristics shared by the search pipeline.
//!
//! Everything here is synchronous and free of I/O. The word tables live in [`lexicon`] so they can
//! be versioned independently of the matching code.

pub mod browse;
pub mod category;
pub mod color;
pub mod lexicon;
pub mod price;
pub mod query;
pub mod safety;
pub mod text;

pub use lexicon::Lexicon;
pub use price::PriceRange;
