use crate::entity::{EntityHandle, EntityId, EntitySet};
use crate::value::FieldValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Monotonically increasing commit identifier. `0` is the sentinel returned
/// by `HistoryManager::commit_head` when history is empty; real commits
/// start at 1.
pub type CommitNumber = u64;

/// One field-level diff produced by a single commit.
///
/// Holds a strong handle to the owning entity so the diff stays replayable
/// after the entity has been deregistered (undoing a delete depends on it).
#[derive(Clone)]
pub struct ChangeRecord {
    entity: EntityHandle,
    entity_id: EntityId,
    field: &'static str,
    old_value: FieldValue,
    new_value: FieldValue,
}

impl ChangeRecord {
    pub(crate) fn new(
        entity: EntityHandle,
        entity_id: EntityId,
        field: &'static str,
        old_value: FieldValue,
        new_value: FieldValue,
    ) -> Self {
        Self {
            entity,
            entity_id,
            field,
            old_value,
            new_value,
        }
    }

    pub fn entity(&self) -> &EntityHandle {
        &self.entity
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn old_value(&self) -> &FieldValue {
        &self.old_value
    }

    pub fn new_value(&self) -> &FieldValue {
        &self.new_value
    }
}

impl fmt::Debug for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChangeRecord({}.{}: {} -> {})",
            self.entity_id, self.field, self.old_value, self.new_value
        )
    }
}

/// One undoable unit: every change record produced by a single commit call,
/// or by several commits merged through `assimilate`.
#[derive(Clone)]
pub struct LogicalCommit {
    number: CommitNumber,
    message: String,
    created: DateTime<Utc>,
    records: Vec<ChangeRecord>,
    tracked: EntitySet,
}

impl LogicalCommit {
    pub(crate) fn new(
        number: CommitNumber,
        message: String,
        records: Vec<ChangeRecord>,
        tracked: EntitySet,
    ) -> Self {
        Self {
            number,
            message,
            created: Utc::now(),
            records,
            tracked,
        }
    }

    pub fn number(&self) -> CommitNumber {
        self.number
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    /// The registered entity set as of this commit. Restored wholesale when
    /// history moves across the commit, which is what brings a deleted
    /// entity back into the graph on undo.
    pub(crate) fn tracked(&self) -> &EntitySet {
        &self.tracked
    }

    /// Folds a later commit into this one, preserving record order. The
    /// merged unit keeps this commit's number and message and adopts the
    /// later commit's registered-set snapshot.
    pub(crate) fn merge(&mut self, later: LogicalCommit) {
        self.records.extend(later.records);
        self.tracked = later.tracked;
    }

    pub fn info(&self) -> CommitInfo {
        let mut entities: Vec<EntityId> = Vec::new();
        for record in &self.records {
            if !entities.contains(&record.entity_id) {
                entities.push(record.entity_id);
            }
        }
        CommitInfo {
            number: self.number,
            message: self.message.clone(),
            created: self.created,
            change_count: self.records.len(),
            entities,
        }
    }
}

impl fmt::Debug for LogicalCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicalCommit")
            .field("number", &self.number)
            .field("message", &self.message)
            .field("records", &self.records)
            .finish()
    }
}

/// Read-only summary of a logical commit, safe to serialize and hand to UI
/// or log output.
#[derive(Debug, Clone, Serialize)]
pub struct CommitInfo {
    pub number: CommitNumber,
    pub message: String,
    pub created: DateTime<Utc>,
    pub change_count: usize,
    pub entities: Vec<EntityId>,
}
