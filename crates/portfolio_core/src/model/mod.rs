//! Domain model for the project portfolio.
//!
//! # Responsibility
//! - Define canonical data structures used by storage, services and analysis.
//!
//! # Invariants
//! - Every project is identified by a storage-assigned integer id.
//! - Deletion is a hard delete; there are no tombstones.

pub mod project;
