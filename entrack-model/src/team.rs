use crate::as_handle;
use entrack_core::{tracked_fields, EntityId, EntityRef, HistoryManager, Trackable};
use crate::Person;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// A team of people.
#[derive(Debug)]
pub struct Team {
    pub id: EntityId,
    pub short_name: String,
    pub description: String,
    pub members: Vec<EntityRef>,
}

tracked_fields!(Team {
    short_name: String,
    description: String,
    members: Vec<EntityRef>,
});

impl Trackable for Team {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Team {
    pub fn new(short_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_name: short_name.to_string(),
            description: String::new(),
            members: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn set_short_name(this: &Rc<RefCell<Self>>, history: &mut HistoryManager, value: &str) {
        this.borrow_mut().short_name = value.to_string();
        history.commit(&as_handle(this), "edit team");
    }

    pub fn set_description(this: &Rc<RefCell<Self>>, history: &mut HistoryManager, value: &str) {
        this.borrow_mut().description = value.to_string();
        history.commit(&as_handle(this), "edit team");
    }

    /// Adds a person to the team. Does nothing if they are already a member.
    pub fn add_member(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        person: &Rc<RefCell<Person>>,
    ) {
        let member = EntityRef::new(person);
        {
            let mut team = this.borrow_mut();
            if team.members.contains(&member) {
                return;
            }
            team.members.push(member);
        }
        history.commit(&as_handle(this), "add team member");
    }

    pub fn remove_member(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        person: &Rc<RefCell<Person>>,
    ) {
        let member = EntityRef::new(person);
        {
            let mut team = this.borrow_mut();
            let before = team.members.len();
            team.members.retain(|m| m != &member);
            if team.members.len() == before {
                return;
            }
        }
        history.commit(&as_handle(this), "remove team member");
    }
}
