//! Repository contracts between the view-model layer and note storage.
//!
//! # Responsibility
//! - Define the observe + mutate contract the view model depends on.
//! - Provide a pass-through over SQLite and an in-memory stand-in.
//!
//! # Invariants
//! - Implementations add no business rules; blank guards live above.
//! - `observe_all` re-emits the full list after every successful write.

pub mod memory;
pub mod note_repo;
