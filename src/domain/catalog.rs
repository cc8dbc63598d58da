//! View state behind the public catalog pages.

pub mod detail;
pub mod fetch_generation;
pub mod listing;

pub use detail::{DetailOutcome, DetailView, FormattedText};
pub use fetch_generation::{FetchGeneration, FetchTicket};
pub use listing::{CategoryFilter, ListingView, ProjectSource, ViewMode};
