use crate::entity::Trackable;
use crate::error::{Error, Result};
use crate::value::FieldValue;

/// One field whose value differs from the entity's last snapshot.
#[derive(Debug, Clone)]
pub(crate) struct FieldDiff {
    pub field: &'static str,
    pub old: FieldValue,
    pub new: FieldValue,
}

/// The tracked-field values of one entity as of its last commit (or its
/// registration, if it has never committed). Field order follows the
/// declaration order in the entity's marker.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    values: Vec<(&'static str, FieldValue)>,
}

impl Snapshot {
    /// Captures the entity's current tracked values. Fails if a declared
    /// field cannot be read or is declared twice - both are configuration
    /// errors in the entity's marker.
    pub fn capture(entity: &dyn Trackable) -> Result<Self> {
        let mut values = Vec::new();
        for &field in entity.tracked_fields() {
            if values.iter().any(|(name, _)| *name == field) {
                return Err(Error::DuplicateField(field.to_string()));
            }
            let value = entity
                .read_field(field)
                .ok_or_else(|| Error::UnknownField(field.to_string()))?;
            values.push((field, value));
        }
        Ok(Self { values })
    }

    /// Verifies that every captured field accepts its own value through the
    /// write path. Called once at registration so a broken marker fails fast
    /// rather than mid-replay.
    pub fn verify(&self, entity: &mut dyn Trackable) -> Result<()> {
        for (field, value) in &self.values {
            entity.write_field(field, value.clone())?;
        }
        Ok(())
    }

    /// Compares the entity's current values against this snapshot, returning
    /// the fields that changed and updating the snapshot to the new values.
    /// The snapshot is updated even when nothing changed, so redundant
    /// commits stay free.
    pub fn diff_and_update(&mut self, entity: &dyn Trackable) -> Result<Vec<FieldDiff>> {
        let mut diffs = Vec::new();
        for (name, old) in self.values.iter_mut() {
            let field = *name;
            let new = entity
                .read_field(field)
                .ok_or_else(|| Error::UnknownField(field.to_string()))?;
            if new != *old {
                diffs.push(FieldDiff {
                    field,
                    old: old.clone(),
                    new: new.clone(),
                });
                *old = new;
            }
        }
        Ok(diffs)
    }

    /// Overwrites one stored value. Used by replay so the snapshot keeps
    /// matching the entity after a direct write-back.
    pub fn put(&mut self, field: &str, value: FieldValue) {
        if let Some((_, stored)) = self.values.iter_mut().find(|(name, _)| *name == field) {
            *stored = value;
        }
    }
}
