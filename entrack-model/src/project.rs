use crate::as_handle;
use entrack_core::{tracked_fields, EntityId, HistoryManager, Trackable};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// A project within the organisation.
#[derive(Debug)]
pub struct Project {
    pub id: EntityId,
    pub short_name: String,
    pub long_name: String,
    pub description: String,
}

tracked_fields!(Project {
    short_name: String,
    long_name: String,
    description: String,
});

impl Trackable for Project {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Project {
    pub fn new(short_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_name: short_name.to_string(),
            long_name: String::new(),
            description: String::new(),
        }
    }

    pub fn with_long_name(mut self, long_name: &str) -> Self {
        self.long_name = long_name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn set_short_name(this: &Rc<RefCell<Self>>, history: &mut HistoryManager, value: &str) {
        this.borrow_mut().short_name = value.to_string();
        history.commit(&as_handle(this), "edit project");
    }

    pub fn set_long_name(this: &Rc<RefCell<Self>>, history: &mut HistoryManager, value: &str) {
        this.borrow_mut().long_name = value.to_string();
        history.commit(&as_handle(this), "edit project");
    }

    pub fn set_description(this: &Rc<RefCell<Self>>, history: &mut HistoryManager, value: &str) {
        this.borrow_mut().description = value.to_string();
        history.commit(&as_handle(this), "edit project");
    }
}
