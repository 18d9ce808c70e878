use crate::as_handle;
use entrack_core::{tracked_fields, EntityId, HistoryManager, Trackable};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// A person who can belong to teams.
#[derive(Debug)]
pub struct Person {
    pub id: EntityId,
    pub short_name: String,
    pub long_name: String,
    pub user_id: String,
}

tracked_fields!(Person {
    short_name: String,
    long_name: String,
    user_id: String,
});

impl Trackable for Person {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Person {
    pub fn new(short_name: &str, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_name: short_name.to_string(),
            long_name: String::new(),
            user_id: user_id.to_string(),
        }
    }

    pub fn with_long_name(mut self, long_name: &str) -> Self {
        self.long_name = long_name.to_string();
        self
    }

    pub fn set_short_name(this: &Rc<RefCell<Self>>, history: &mut HistoryManager, value: &str) {
        this.borrow_mut().short_name = value.to_string();
        history.commit(&as_handle(this), "edit person");
    }

    pub fn set_user_id(this: &Rc<RefCell<Self>>, history: &mut HistoryManager, value: &str) {
        this.borrow_mut().user_id = value.to_string();
        history.commit(&as_handle(this), "edit person");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_then_revert_restores_user_id() {
        let mut history = HistoryManager::new();
        let person = Rc::new(RefCell::new(Person::new("sam", "sjones")));
        history.add(&as_handle(&person)).unwrap();

        Person::set_user_id(&person, &mut history, "samj");
        assert_eq!(person.borrow().user_id, "samj");

        history.revert().unwrap();
        assert_eq!(person.borrow().user_id, "sjones");
    }
}
