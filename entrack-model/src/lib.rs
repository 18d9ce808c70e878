//! Sample domain model built on the `entrack-core` tracking engine.
//!
//! An [`Organisation`] is the graph root; it references projects, people
//! and teams. Every mutating operation ends with a commit, and composite
//! operations (create, remove) collapse their commits into a single
//! undoable step with the `commit_head` / `assimilate` bracket.

pub mod organisation;
pub mod person;
pub mod project;
pub mod team;

pub use organisation::Organisation;
pub use person::Person;
pub use project::Project;
pub use team::Team;

use entrack_core::{EntityHandle, Trackable};
use std::cell::RefCell;
use std::rc::Rc;

/// Coerces a concrete entity handle to the trait-object handle the
/// history manager works with.
pub fn as_handle<T: Trackable + 'static>(entity: &Rc<RefCell<T>>) -> EntityHandle {
    entity.clone()
}
