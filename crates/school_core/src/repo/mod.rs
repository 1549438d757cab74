//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the single authoritative gateway to the school store.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes re-run input validation before any SQL mutation.
//! - Multi-row mutations (rename, import) run inside one IMMEDIATE transaction.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateEmail`, ...)
//!   in addition to DB transport errors.

mod readiness;
pub mod school_repo;
