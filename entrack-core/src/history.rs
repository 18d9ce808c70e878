use crate::entity::{EntityHandle, EntityId, EntitySet, Trackable};
use crate::error::{Error, Result};
use crate::listener::{ChangeListener, ChangeState, ListenerSet};
use crate::record::{ChangeRecord, CommitInfo, CommitNumber, LogicalCommit};
use crate::snapshot::Snapshot;
use crate::value::FieldValue;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Owns the commit log, the undo/redo state and the registered entity set.
///
/// The manager is an ordinary value: the application's composition root owns
/// one and passes it to whatever code registers entities or drives undo and
/// redo. All operations are synchronous and must run on a single thread;
/// the manager holds no locks.
///
/// The log is a single ordered `Vec` of logical commits with a head index:
/// commits below the head form the undo stack, commits at and above it form
/// the redo stack. A new commit truncates the redo region, which gives the
/// standard linear history.
pub struct HistoryManager {
    log: Vec<LogicalCommit>,
    head: usize,
    entities: EntitySet,
    baseline: EntitySet,
    baseline_frozen: bool,
    snapshots: HashMap<EntityId, Snapshot>,
    listeners: ListenerSet,
    next_number: CommitNumber,
    max_depth: Option<usize>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            head: 0,
            entities: Vec::new(),
            baseline: Vec::new(),
            baseline_frozen: false,
            snapshots: HashMap::new(),
            listeners: ListenerSet::default(),
            next_number: 1,
            max_depth: None,
        }
    }

    /// Registers an entity and everything reachable from its tracked
    /// reference fields, capturing their snapshot baselines. Re-adding an
    /// already registered entity is a no-op, which also breaks reference
    /// cycles during the recursion.
    ///
    /// Fails only on a broken field marker; that is a programming error and
    /// is surfaced here rather than at commit time.
    pub fn add(&mut self, entity: &EntityHandle) -> Result<()> {
        let id = entity.borrow().entity_id();
        if self.is_registered(id) {
            return Ok(());
        }

        let snapshot = Snapshot::capture(&*entity.borrow())?;
        snapshot.verify(&mut *entity.borrow_mut())?;
        self.snapshots.insert(id, snapshot);
        self.entities.push((id, entity.clone()));
        self.amend_baseline();
        debug!(%id, "registered entity");

        for child in referenced_handles(&*entity.borrow()) {
            self.add(&child)?;
        }
        Ok(())
    }

    /// Deregisters an entity. Existing history referencing it is kept, so a
    /// delete remains undoable.
    pub fn remove(&mut self, entity: &EntityHandle) {
        if let Some(index) = self
            .entities
            .iter()
            .position(|(_, e)| Rc::ptr_eq(e, entity))
        {
            let (id, _) = self.entities.remove(index);
            self.amend_baseline();
            debug!(%id, "deregistered entity");
        }
    }

    pub fn is_registered(&self, id: EntityId) -> bool {
        self.entities.iter().any(|(eid, _)| *eid == id)
    }

    /// Handles of the currently registered entities, in registration order.
    pub fn entities(&self) -> Vec<EntityHandle> {
        self.entities.iter().map(|(_, e)| e.clone()).collect()
    }

    /// Diffs the entity against its last snapshot and, if anything changed,
    /// appends one logical commit tagged with `message`. Returns the number
    /// of the most recent commit either way.
    ///
    /// Never fails: committing an unregistered entity or an unchanged one
    /// leaves history untouched.
    pub fn commit(&mut self, entity: &EntityHandle, message: &str) -> CommitNumber {
        let id = entity.borrow().entity_id();
        if !self.is_registered(id) {
            warn!(%id, message, "commit on unregistered entity ignored");
            return self.commit_head();
        }
        let Some(snapshot) = self.snapshots.get_mut(&id) else {
            warn!(%id, message, "commit on entity without snapshot ignored");
            return self.commit_head();
        };

        let diffs = match snapshot.diff_and_update(&*entity.borrow()) {
            Ok(diffs) => diffs,
            Err(err) => {
                warn!(%id, %err, "commit skipped: tracked field unreadable");
                return self.commit_head();
            }
        };
        if diffs.is_empty() {
            trace!(%id, message, "no-op commit");
            return self.commit_head();
        }

        let records: Vec<ChangeRecord> = diffs
            .into_iter()
            .map(|diff| ChangeRecord::new(entity.clone(), id, diff.field, diff.old, diff.new))
            .collect();

        // a new commit discards anything a prior revert left in the redo region
        self.log.truncate(self.head);
        let number = self.next_number;
        self.next_number += 1;
        self.log.push(LogicalCommit::new(
            number,
            message.to_string(),
            records,
            self.entities.clone(),
        ));
        self.head += 1;
        self.enforce_depth_limit();

        debug!(number, message, "commit");
        self.listeners.notify(ChangeState::Commit);
        number
    }

    /// The number of the most recent logical commit, or 0 if history is
    /// empty. Composite operations record this before starting so they can
    /// `assimilate` everything they caused afterwards.
    pub fn commit_head(&self) -> CommitNumber {
        self.log[..self.head].last().map(LogicalCommit::number).unwrap_or(0)
    }

    /// Merges every logical commit made strictly after `baseline` into one,
    /// keeping record order and the first commit's message. Must not be
    /// called with a revert pending redo.
    pub fn assimilate(&mut self, baseline: CommitNumber) -> Result<()> {
        if self.head < self.log.len() {
            return Err(Error::InvalidOperation(
                "assimilate with pending redo history".to_string(),
            ));
        }
        let start = if baseline == 0 {
            0
        } else {
            match self.log.iter().position(|c| c.number() == baseline) {
                Some(index) => index + 1,
                None => return Err(Error::CommitNotFound(baseline)),
            }
        };

        let mut drained = self.log.split_off(start).into_iter();
        let Some(mut merged) = drained.next() else {
            return Ok(());
        };
        for commit in drained {
            merged.merge(commit);
        }
        debug!(baseline, number = merged.number(), "assimilated commits");
        self.log.push(merged);
        self.head = self.log.len();
        self.listeners.notify(ChangeState::Commit);
        Ok(())
    }

    pub fn can_revert(&self) -> bool {
        self.head > 0
    }

    pub fn can_remake(&self) -> bool {
        self.head < self.log.len()
    }

    /// Message of the commit the next `revert` would undo.
    pub fn revert_message(&self) -> Option<&str> {
        self.log[..self.head].last().map(LogicalCommit::message)
    }

    /// Message of the commit the next `remake` would reapply.
    pub fn remake_message(&self) -> Option<&str> {
        self.log.get(self.head).map(LogicalCommit::message)
    }

    /// Undoes the most recent logical commit. Field values are written back
    /// directly, bypassing entity mutators, so no re-entrant commits occur.
    ///
    /// On a replay inconsistency [`Error::ReplayFailed`] is returned and
    /// entity state is left as far as the replay got. History can no longer
    /// be trusted at that point; the caller decides whether to discard it
    /// with [`HistoryManager::forget`].
    pub fn revert(&mut self) -> Result<()> {
        self.revert_one()?;
        self.listeners.notify(ChangeState::Revert);
        Ok(())
    }

    /// Undoes logical commits from the head down to and including commit
    /// `number`, notifying listeners once.
    pub fn revert_to(&mut self, number: CommitNumber) -> Result<()> {
        if !self.log[..self.head].iter().any(|c| c.number() == number) {
            return Err(Error::CommitNotFound(number));
        }
        loop {
            let reverted = self.commit_head();
            self.revert_one()?;
            if reverted == number {
                break;
            }
        }
        self.listeners.notify(ChangeState::Revert);
        Ok(())
    }

    /// Reapplies the most recently reverted logical commit.
    pub fn remake(&mut self) -> Result<()> {
        self.remake_one()?;
        self.listeners.notify(ChangeState::Remake);
        Ok(())
    }

    /// Reapplies reverted commits up to and including commit `number`,
    /// notifying listeners once.
    pub fn remake_to(&mut self, number: CommitNumber) -> Result<()> {
        if !self.log[self.head..].iter().any(|c| c.number() == number) {
            return Err(Error::CommitNotFound(number));
        }
        loop {
            self.remake_one()?;
            if self.commit_head() == number {
                break;
            }
        }
        self.listeners.notify(ChangeState::Remake);
        Ok(())
    }

    /// Clears all history without touching current entity state. The
    /// last-resort recovery action after a replay failure.
    pub fn forget(&mut self) {
        self.log.clear();
        self.head = 0;
        self.baseline = self.entities.clone();
        self.baseline_frozen = true;
        let registered: Vec<EntityId> = self.entities.iter().map(|(id, _)| *id).collect();
        self.snapshots.retain(|id, _| registered.contains(id));
        debug!("history forgotten");
        self.listeners.notify(ChangeState::Forget);
    }

    /// Replaces the registered entity set with everything reachable from
    /// `roots` and discards all history. The new graph is the zero state:
    /// nothing to undo, nothing to redo.
    pub fn import_baseline(&mut self, roots: &[EntityHandle]) -> Result<()> {
        self.log.clear();
        self.head = 0;
        self.entities.clear();
        self.snapshots.clear();
        self.next_number = 1;
        self.baseline_frozen = false;
        for root in roots {
            self.add(root)?;
        }
        self.baseline = self.entities.clone();
        self.baseline_frozen = true;
        debug!(entities = self.entities.len(), "baseline imported");
        self.listeners.notify(ChangeState::Commit);
        Ok(())
    }

    /// Commits currently on the undo stack, newest first.
    pub fn undo_history(&self) -> Vec<CommitInfo> {
        self.log[..self.head].iter().rev().map(LogicalCommit::info).collect()
    }

    /// Commits currently on the redo stack, next-to-remake first.
    pub fn redo_history(&self) -> Vec<CommitInfo> {
        self.log[self.head..].iter().map(LogicalCommit::info).collect()
    }

    /// Caps the undo stack depth; the oldest commit is dropped once the cap
    /// is exceeded. `None` (the default) keeps unlimited history.
    pub fn set_maximum_depth(&mut self, limit: Option<usize>) {
        self.max_depth = limit;
        self.enforce_depth_limit();
    }

    pub fn maximum_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn add_listener(&mut self, listener: &Rc<dyn ChangeListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&mut self, listener: &Rc<dyn ChangeListener>) {
        self.listeners.remove(listener);
    }

    fn revert_one(&mut self) -> Result<()> {
        if !self.can_revert() {
            return Err(Error::NothingToRevert);
        }
        self.head -= 1;

        let mut failure = None;
        {
            let commit = &self.log[self.head];
            for record in commit.records().iter().rev() {
                if let Err(err) = write_back(record, record.old_value(), &mut self.snapshots) {
                    failure = Some(err);
                    break;
                }
            }
        }
        if let Some(err) = failure {
            // the commit stays on the undo stack; only its replay failed
            self.head += 1;
            return Err(replay_error(err));
        }

        let number = self.log[self.head].number();
        self.entities = match self.head.checked_sub(1) {
            Some(previous) => self.log[previous].tracked().clone(),
            None => self.baseline.clone(),
        };
        debug!(number, "revert");
        Ok(())
    }

    fn remake_one(&mut self) -> Result<()> {
        if !self.can_remake() {
            return Err(Error::NothingToRemake);
        }

        let mut failure = None;
        {
            let commit = &self.log[self.head];
            for record in commit.records() {
                if let Err(err) = write_back(record, record.new_value(), &mut self.snapshots) {
                    failure = Some(err);
                    break;
                }
            }
        }
        if let Some(err) = failure {
            return Err(replay_error(err));
        }

        self.entities = self.log[self.head].tracked().clone();
        debug!(number = self.log[self.head].number(), "remake");
        self.head += 1;
        Ok(())
    }

    /// Registrations made before the first commit belong to the zero state.
    /// Once a baseline has been imported (or history forgotten), later
    /// registrations are expected to be anchored by a commit instead, so the
    /// zero state stays fixed.
    fn amend_baseline(&mut self) {
        if self.log.is_empty() && !self.baseline_frozen {
            self.baseline = self.entities.clone();
        }
    }

    fn enforce_depth_limit(&mut self) {
        if let Some(limit) = self.max_depth {
            while self.head > limit && !self.log.is_empty() {
                let dropped = self.log.remove(0);
                self.baseline = dropped.tracked().clone();
                self.head -= 1;
                trace!(number = dropped.number(), "dropped oldest commit");
            }
        }
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

fn replay_error(err: Error) -> Error {
    let err = match err {
        Error::ReplayFailed(_) => err,
        other => Error::ReplayFailed(other.to_string()),
    };
    warn!(%err, "replay aborted");
    err
}

/// Handles of entities referenced by the tracked fields of `entity`.
fn referenced_handles(entity: &dyn Trackable) -> Vec<EntityHandle> {
    let mut handles = Vec::new();
    for &field in entity.tracked_fields() {
        match entity.read_field(field) {
            Some(FieldValue::Ref(entity_ref)) => handles.push(entity_ref.handle().clone()),
            Some(FieldValue::RefList(list)) => {
                handles.extend(list.iter().map(|r| r.handle().clone()));
            }
            _ => {}
        }
    }
    handles
}

/// The privileged replay path: writes a value straight into the entity's
/// field and keeps the entity's snapshot in step so the write does not show
/// up as a fresh diff on the next commit.
fn write_back(
    record: &ChangeRecord,
    value: &FieldValue,
    snapshots: &mut HashMap<EntityId, Snapshot>,
) -> Result<()> {
    let mut entity = record.entity().try_borrow_mut().map_err(|_| {
        Error::ReplayFailed(format!("entity {} is inaccessible", record.entity_id()))
    })?;
    entity.write_field(record.field(), value.clone())?;
    if let Some(snapshot) = snapshots.get_mut(&record.entity_id()) {
        snapshot.put(record.field(), value.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TrackedFields;
    use crate::value::EntityRef;
    use std::cell::RefCell;
    use uuid::Uuid;

    struct Task {
        id: EntityId,
        name: String,
        estimate: i64,
        done: bool,
    }

    crate::tracked_fields!(Task {
        name: String,
        estimate: i64,
        done: bool,
    });

    impl Trackable for Task {
        fn entity_id(&self) -> EntityId {
            self.id
        }
    }

    struct Board {
        id: EntityId,
        title: String,
        tasks: Vec<EntityRef>,
    }

    crate::tracked_fields!(Board {
        title: String,
        tasks: Vec<EntityRef>,
    });

    impl Trackable for Board {
        fn entity_id(&self) -> EntityId {
            self.id
        }
    }

    // write path always fails, to provoke a replay inconsistency
    struct Stubborn {
        id: EntityId,
        flips: i64,
    }

    impl TrackedFields for Stubborn {
        fn tracked_fields(&self) -> &'static [&'static str] {
            &["flips"]
        }

        fn read_field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "flips" => Some(FieldValue::Int(self.flips)),
                _ => None,
            }
        }

        fn write_field(&mut self, _name: &str, _value: FieldValue) -> Result<()> {
            Err(Error::InvalidOperation("write refused".to_string()))
        }
    }

    impl Trackable for Stubborn {
        fn entity_id(&self) -> EntityId {
            self.id
        }
    }

    struct Recorder {
        seen: RefCell<Vec<ChangeState>>,
    }

    impl ChangeListener for Recorder {
        fn on_change(&self, state: ChangeState) {
            self.seen.borrow_mut().push(state);
        }
    }

    fn task(name: &str) -> Rc<RefCell<Task>> {
        Rc::new(RefCell::new(Task {
            id: Uuid::new_v4(),
            name: name.to_string(),
            estimate: 0,
            done: false,
        }))
    }

    fn handle(task: &Rc<RefCell<Task>>) -> EntityHandle {
        task.clone()
    }

    #[test]
    fn test_commit_then_revert_then_remake_round_trip() {
        let mut history = HistoryManager::new();
        let t = task("write draft");
        history.add(&handle(&t)).unwrap();

        t.borrow_mut().name = "write final".to_string();
        t.borrow_mut().estimate = 3;
        history.commit(&handle(&t), "edit task");

        history.revert().unwrap();
        assert_eq!(t.borrow().name, "write draft");
        assert_eq!(t.borrow().estimate, 0);

        history.remake().unwrap();
        assert_eq!(t.borrow().name, "write final");
        assert_eq!(t.borrow().estimate, 3);
    }

    #[test]
    fn test_noop_commit_produces_no_logical_commit() {
        let mut history = HistoryManager::new();
        let t = task("idle");
        history.add(&handle(&t)).unwrap();

        t.borrow_mut().done = true;
        let first = history.commit(&handle(&t), "finish task");
        let second = history.commit(&handle(&t), "finish task");

        assert_eq!(first, second);
        assert_eq!(history.undo_history().len(), 1);
    }

    #[test]
    fn test_commit_on_unregistered_entity_is_ignored() {
        let mut history = HistoryManager::new();
        let t = task("stray");
        t.borrow_mut().done = true;

        assert_eq!(history.commit(&handle(&t), "edit task"), 0);
        assert!(!history.can_revert());
    }

    #[test]
    fn test_n_commits_take_n_reverts_to_baseline() {
        let mut history = HistoryManager::new();
        let t = task("count");
        history.add(&handle(&t)).unwrap();

        for i in 1..=4 {
            t.borrow_mut().estimate = i;
            history.commit(&handle(&t), "edit task");
        }

        for _ in 0..4 {
            assert!(history.can_revert());
            history.revert().unwrap();
        }
        assert!(!history.can_revert());
        assert_eq!(t.borrow().estimate, 0);
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut history = HistoryManager::new();
        let t = task("branch");
        history.add(&handle(&t)).unwrap();

        t.borrow_mut().estimate = 1;
        history.commit(&handle(&t), "edit task");
        history.revert().unwrap();
        assert!(history.can_remake());

        t.borrow_mut().estimate = 2;
        history.commit(&handle(&t), "edit task");
        assert!(!history.can_remake());
    }

    #[test]
    fn test_revert_and_remake_messages_label_the_next_step() {
        let mut history = HistoryManager::new();
        let t = task("label");
        history.add(&handle(&t)).unwrap();

        t.borrow_mut().name = "renamed".to_string();
        history.commit(&handle(&t), "rename task");
        t.borrow_mut().done = true;
        history.commit(&handle(&t), "finish task");

        assert_eq!(history.revert_message(), Some("finish task"));
        assert_eq!(history.remake_message(), None);

        history.revert().unwrap();
        assert_eq!(history.revert_message(), Some("rename task"));
        assert_eq!(history.remake_message(), Some("finish task"));
    }

    #[test]
    fn test_revert_on_empty_history_fails_cleanly() {
        let mut history = HistoryManager::new();
        assert!(matches!(history.revert(), Err(Error::NothingToRevert)));
        assert!(matches!(history.remake(), Err(Error::NothingToRemake)));
    }

    #[test]
    fn test_assimilate_collapses_to_one_undo_step() {
        let mut history = HistoryManager::new();
        let t = task("multi");
        history.add(&handle(&t)).unwrap();

        let baseline = history.commit_head();
        t.borrow_mut().name = "step one".to_string();
        history.commit(&handle(&t), "edit name");
        t.borrow_mut().estimate = 5;
        history.commit(&handle(&t), "edit estimate");
        t.borrow_mut().done = true;
        history.commit(&handle(&t), "edit done");

        history.assimilate(baseline).unwrap();
        assert_eq!(history.undo_history().len(), 1);
        assert_eq!(history.revert_message(), Some("edit name"));

        history.revert().unwrap();
        assert_eq!(t.borrow().name, "multi");
        assert_eq!(t.borrow().estimate, 0);
        assert!(!t.borrow().done);
    }

    #[test]
    fn test_assimilate_from_mid_history() {
        let mut history = HistoryManager::new();
        let t = task("mid");
        history.add(&handle(&t)).unwrap();

        for i in 1..=5 {
            t.borrow_mut().estimate = i;
            history.commit(&handle(&t), "edit task");
        }
        let baseline = history.commit_head();
        assert_eq!(baseline, 5);

        for i in 6..=8 {
            t.borrow_mut().estimate = i;
            history.commit(&handle(&t), "edit task");
        }
        assert_eq!(history.undo_history().len(), 8);

        history.assimilate(baseline).unwrap();
        assert_eq!(history.undo_history().len(), 6);

        history.revert().unwrap();
        assert_eq!(t.borrow().estimate, 5);
    }

    #[test]
    fn test_assimilate_rejects_pending_redo() {
        let mut history = HistoryManager::new();
        let t = task("pending");
        history.add(&handle(&t)).unwrap();

        t.borrow_mut().estimate = 1;
        history.commit(&handle(&t), "edit task");
        history.revert().unwrap();

        assert!(matches!(
            history.assimilate(0),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_assimilate_unknown_baseline_fails() {
        let mut history = HistoryManager::new();
        let t = task("unknown");
        history.add(&handle(&t)).unwrap();
        t.borrow_mut().estimate = 1;
        history.commit(&handle(&t), "edit task");

        assert!(matches!(
            history.assimilate(42),
            Err(Error::CommitNotFound(42))
        ));
    }

    #[test]
    fn test_import_baseline_discards_history() {
        let mut history = HistoryManager::new();
        let t = task("old world");
        history.add(&handle(&t)).unwrap();
        t.borrow_mut().estimate = 9;
        history.commit(&handle(&t), "edit task");
        history.revert().unwrap();

        let fresh = task("new world");
        history.import_baseline(&[handle(&fresh)]).unwrap();

        assert!(!history.can_revert());
        assert!(!history.can_remake());
        assert!(history.is_registered(fresh.borrow().id));
        assert!(!history.is_registered(t.borrow().id));
    }

    #[test]
    fn test_undo_of_create_removes_entity_from_graph() {
        let mut history = HistoryManager::new();
        let board = Rc::new(RefCell::new(Board {
            id: Uuid::new_v4(),
            title: "sprint".to_string(),
            tasks: Vec::new(),
        }));
        let board_handle: EntityHandle = board.clone();
        // a loaded graph is the zero state; creation happens on top of it
        history.import_baseline(&[board_handle.clone()]).unwrap();

        // composite create: register the child, link it, one undo step
        let baseline = history.commit_head();
        let t = task("brand new");
        history.add(&handle(&t)).unwrap();
        board.borrow_mut().tasks.push(EntityRef::new(&t));
        history.commit(&board_handle, "create task");
        history.assimilate(baseline).unwrap();

        let task_id = t.borrow().id;
        assert!(history.is_registered(task_id));
        assert_eq!(board.borrow().tasks.len(), 1);

        history.revert().unwrap();
        assert!(!history.is_registered(task_id));
        assert!(board.borrow().tasks.is_empty());

        history.remake().unwrap();
        assert!(history.is_registered(task_id));
        assert_eq!(board.borrow().tasks.len(), 1);
    }

    #[test]
    fn test_undo_of_delete_restores_entity_to_graph() {
        let mut history = HistoryManager::new();
        let board = Rc::new(RefCell::new(Board {
            id: Uuid::new_v4(),
            title: "sprint".to_string(),
            tasks: Vec::new(),
        }));
        let board_handle: EntityHandle = board.clone();
        let t = task("doomed");
        board.borrow_mut().tasks.push(EntityRef::new(&t));
        history.import_baseline(&[board_handle.clone()]).unwrap();
        let task_id = t.borrow().id;
        assert!(history.is_registered(task_id));

        board.borrow_mut().tasks.clear();
        history.remove(&handle(&t));
        history.commit(&board_handle, "remove task");
        assert!(!history.is_registered(task_id));

        history.revert().unwrap();
        assert!(history.is_registered(task_id));
        assert_eq!(board.borrow().tasks.len(), 1);
        assert_eq!(board.borrow().tasks[0].id(), task_id);
    }

    #[test]
    fn test_recursive_add_reaches_referenced_entities() {
        let mut history = HistoryManager::new();
        let t1 = task("one");
        let t2 = task("two");
        let board = Rc::new(RefCell::new(Board {
            id: Uuid::new_v4(),
            title: "sprint".to_string(),
            tasks: vec![EntityRef::new(&t1), EntityRef::new(&t2)],
        }));
        let board_handle: EntityHandle = board.clone();

        history.add(&board_handle).unwrap();
        assert!(history.is_registered(t1.borrow().id));
        assert!(history.is_registered(t2.borrow().id));

        // children commit on their own once registered this way
        t1.borrow_mut().done = true;
        history.commit(&handle(&t1), "finish task");
        assert!(history.can_revert());
    }

    #[test]
    fn test_broken_marker_fails_at_registration() {
        let mut history = HistoryManager::new();
        let stubborn = Rc::new(RefCell::new(Stubborn {
            id: Uuid::new_v4(),
            flips: 0,
        }));
        let stubborn_handle: EntityHandle = stubborn.clone();
        // registration must already reject an entity whose writes fail
        assert!(history.add(&stubborn_handle).is_err());
        assert!(!history.is_registered(stubborn.borrow().id));
    }

    #[test]
    fn test_replay_borrow_conflict_surfaces_failure() {
        let mut history = HistoryManager::new();
        let t = task("held");
        history.add(&handle(&t)).unwrap();
        t.borrow_mut().estimate = 2;
        history.commit(&handle(&t), "edit task");

        let held = t.borrow_mut();
        let result = history.revert();
        drop(held);

        assert!(matches!(result, Err(Error::ReplayFailed(_))));
        // the stacks are untouched; discarding them is the caller's call
        assert!(history.can_revert());

        history.forget();
        assert!(!history.can_revert());
        assert!(!history.can_remake());
    }

    #[test]
    fn test_listener_sequence_and_forget() {
        let mut history = HistoryManager::new();
        let recorder = Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        });
        let listener: Rc<dyn ChangeListener> = recorder.clone();
        history.add_listener(&listener);

        let t = task("observed");
        history.add(&handle(&t)).unwrap();
        t.borrow_mut().done = true;
        history.commit(&handle(&t), "finish task");
        history.revert().unwrap();
        history.remake().unwrap();
        history.forget();

        assert_eq!(
            *recorder.seen.borrow(),
            vec![
                ChangeState::Commit,
                ChangeState::Revert,
                ChangeState::Remake,
                ChangeState::Forget,
            ]
        );
        assert!(!history.can_revert());
        assert!(!history.can_remake());
    }

    #[test]
    fn test_maximum_depth_drops_oldest_commit() {
        let mut history = HistoryManager::new();
        history.set_maximum_depth(Some(2));
        let t = task("capped");
        history.add(&handle(&t)).unwrap();

        for i in 1..=5 {
            t.borrow_mut().estimate = i;
            history.commit(&handle(&t), "edit task");
        }

        assert_eq!(history.undo_history().len(), 2);
        history.revert().unwrap();
        history.revert().unwrap();
        assert!(!history.can_revert());
        // oldest surviving baseline, not the initial zero state
        assert_eq!(t.borrow().estimate, 3);
    }

    #[test]
    fn test_revert_to_walks_multiple_commits() {
        let mut history = HistoryManager::new();
        let t = task("walk");
        history.add(&handle(&t)).unwrap();

        let mut numbers = Vec::new();
        for i in 1..=4 {
            t.borrow_mut().estimate = i;
            numbers.push(history.commit(&handle(&t), "edit task"));
        }

        history.revert_to(numbers[1]).unwrap();
        assert_eq!(t.borrow().estimate, 1);
        assert_eq!(history.undo_history().len(), 1);

        history.remake_to(numbers[3]).unwrap();
        assert_eq!(t.borrow().estimate, 4);
        assert!(!history.can_remake());
    }

    #[test]
    fn test_forget_keeps_entity_state_and_registration() {
        let mut history = HistoryManager::new();
        let t = task("survivor");
        history.add(&handle(&t)).unwrap();
        t.borrow_mut().estimate = 7;
        history.commit(&handle(&t), "edit task");

        history.forget();

        assert_eq!(t.borrow().estimate, 7);
        assert!(history.is_registered(t.borrow().id));
        // edits after a forget start a fresh history
        t.borrow_mut().estimate = 8;
        history.commit(&handle(&t), "edit task");
        assert!(history.can_revert());
        history.revert().unwrap();
        assert_eq!(t.borrow().estimate, 7);
    }
}
