//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the single persisted record shared by store, repository and
//!   view-model layers.
//!
//! # Invariants
//! - Every persisted note is identified by a store-assigned `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
