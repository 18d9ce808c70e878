use crate::as_handle;
use crate::{Person, Project, Team};
use entrack_core::{tracked_fields, EntityId, EntityRef, HistoryManager, Result, Trackable};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

/// Root of the domain model. Owns references to every project, person
/// and team, so registering the organisation registers the whole graph.
#[derive(Debug)]
pub struct Organisation {
    pub id: EntityId,
    pub short_name: String,
    pub projects: Vec<EntityRef>,
    pub people: Vec<EntityRef>,
    pub teams: Vec<EntityRef>,
}

tracked_fields!(Organisation {
    short_name: String,
    projects: Vec<EntityRef>,
    people: Vec<EntityRef>,
    teams: Vec<EntityRef>,
});

impl Trackable for Organisation {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

impl Organisation {
    pub fn new(short_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_name: short_name.to_string(),
            projects: Vec::new(),
            people: Vec::new(),
            teams: Vec::new(),
        }
    }

    /// Creates a project, registers it and links it to the organisation
    /// as a single undoable step.
    pub fn create_project(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        project: Project,
    ) -> Result<Rc<RefCell<Project>>> {
        let baseline = history.commit_head();
        let project = Rc::new(RefCell::new(project));
        history.add(&as_handle(&project))?;
        this.borrow_mut().projects.push(EntityRef::new(&project));
        history.commit(&as_handle(this), "create project");
        history.assimilate(baseline)?;
        debug!(short_name = %project.borrow().short_name, "project created");
        Ok(project)
    }

    pub fn remove_project(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        project: &Rc<RefCell<Project>>,
    ) -> Result<()> {
        let baseline = history.commit_head();
        let target = EntityRef::new(project);
        this.borrow_mut().projects.retain(|p| p != &target);
        history.remove(&as_handle(project));
        history.commit(&as_handle(this), "remove project");
        history.assimilate(baseline)
    }

    pub fn create_person(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        person: Person,
    ) -> Result<Rc<RefCell<Person>>> {
        let baseline = history.commit_head();
        let person = Rc::new(RefCell::new(person));
        history.add(&as_handle(&person))?;
        this.borrow_mut().people.push(EntityRef::new(&person));
        history.commit(&as_handle(this), "create person");
        history.assimilate(baseline)?;
        Ok(person)
    }

    /// Removes a person from the organisation and from every team they
    /// belong to, collapsed into one undoable step.
    pub fn remove_person(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        person: &Rc<RefCell<Person>>,
    ) -> Result<()> {
        let baseline = history.commit_head();
        let teams = this.borrow().teams();
        for team in &teams {
            Team::remove_member(team, history, person);
        }
        let target = EntityRef::new(person);
        this.borrow_mut().people.retain(|p| p != &target);
        history.remove(&as_handle(person));
        history.commit(&as_handle(this), "remove person");
        debug!(teams = teams.len(), "person removed");
        history.assimilate(baseline)
    }

    pub fn create_team(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        team: Team,
    ) -> Result<Rc<RefCell<Team>>> {
        let baseline = history.commit_head();
        let team = Rc::new(RefCell::new(team));
        history.add(&as_handle(&team))?;
        this.borrow_mut().teams.push(EntityRef::new(&team));
        history.commit(&as_handle(this), "create team");
        history.assimilate(baseline)?;
        Ok(team)
    }

    pub fn remove_team(
        this: &Rc<RefCell<Self>>,
        history: &mut HistoryManager,
        team: &Rc<RefCell<Team>>,
    ) -> Result<()> {
        let baseline = history.commit_head();
        let target = EntityRef::new(team);
        this.borrow_mut().teams.retain(|t| t != &target);
        history.remove(&as_handle(team));
        history.commit(&as_handle(this), "remove team");
        history.assimilate(baseline)
    }

    pub fn projects(&self) -> Vec<Rc<RefCell<Project>>> {
        self.projects.iter().filter_map(|p| p.downcast()).collect()
    }

    pub fn people(&self) -> Vec<Rc<RefCell<Person>>> {
        self.people.iter().filter_map(|p| p.downcast()).collect()
    }

    pub fn teams(&self) -> Vec<Rc<RefCell<Team>>> {
        self.teams.iter().filter_map(|t| t.downcast()).collect()
    }
}
