//! Record search over hydrated entities.
//!
//! # Responsibility
//! - Filter students, instructors and courses by a text query on one field.
//!
//! # Invariants
//! - Matching is case-insensitive substring matching on trimmed query text.
//! - An empty query matches every entity.
//! - A field that does not apply to an entity kind never matches.

mod filter;

pub use filter::{filter_entities, matches, SearchField, Searchable, UnknownSearchField};
