//! Query/aggregation layer between storage and the note screens.
//!
//! # Responsibility
//! - Derive the displayed note list from the live feed, search and filter.
//! - Own transient UI state: selection, notifications, edit sessions.
//! - Keep presentation code decoupled from storage details.

pub mod editor;
pub mod notification;
pub mod query;
pub mod view_model;
