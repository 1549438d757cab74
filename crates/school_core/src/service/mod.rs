//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Validate user input at the boundary before any store access.
//! - Keep UI layers decoupled from storage details.

pub mod school_service;
