//! # entrack-core
//!
//! Generic change tracking and undo/redo for domain entities.
//!
//! Entities opt in by marking fields with [`tracked_fields!`]; every mutating
//! operation ends with a [`HistoryManager::commit`] call that diffs the
//! entity against its last snapshot and appends the result to a single
//! ordered commit log. [`HistoryManager::revert`] and
//! [`HistoryManager::remake`] replay those diffs backward and forward,
//! [`HistoryManager::assimilate`] collapses composite operations into one
//! undoable step, and [`ChangeListener`]s are told whenever the history
//! changes shape.

pub mod entity;
pub mod error;
pub mod history;
pub mod listener;
pub mod record;
mod snapshot;
pub mod value;

pub use entity::{EntityHandle, EntityId, Trackable, TrackedFields};
pub use error::{Error, Result};
pub use history::HistoryManager;
pub use listener::{ChangeListener, ChangeState};
pub use record::{ChangeRecord, CommitInfo, CommitNumber, LogicalCommit};
pub use value::{EntityRef, FieldValue};
