pub mod create;
pub mod edit;
pub mod forget;
pub mod history;
pub mod member;
pub mod remove;
pub mod status;
pub mod undo;

use entrack_core::HistoryManager;
use entrack_model::{Organisation, Person, Project, Team};
use std::cell::RefCell;
use std::rc::Rc;

/// Everything a command needs: the history manager and the organisation
/// it tracks.
pub struct App {
    pub history: HistoryManager,
    pub org: Rc<RefCell<Organisation>>,
}

pub fn find_project(app: &App, name: &str) -> Option<Rc<RefCell<Project>>> {
    app.org
        .borrow()
        .projects()
        .into_iter()
        .find(|p| p.borrow().short_name == name)
}

pub fn find_person(app: &App, name: &str) -> Option<Rc<RefCell<Person>>> {
    app.org
        .borrow()
        .people()
        .into_iter()
        .find(|p| p.borrow().short_name == name)
}

pub fn find_team(app: &App, name: &str) -> Option<Rc<RefCell<Team>>> {
    app.org
        .borrow()
        .teams()
        .into_iter()
        .find(|t| t.borrow().short_name == name)
}
