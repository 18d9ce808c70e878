use crate::entity::{EntityHandle, EntityId, Trackable};
use chrono::{DateTime, Utc};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A live reference to another tracked entity.
///
/// Compared by pointer identity, not by value: two references are equal only
/// if they point at the same entity instance. Holding the reference keeps the
/// entity alive, which is what lets a delete be undone after the entity has
/// been deregistered.
#[derive(Clone)]
pub struct EntityRef {
    handle: EntityHandle,
    any: Rc<dyn Any>,
}

impl EntityRef {
    pub fn new<T: Trackable + 'static>(entity: &Rc<RefCell<T>>) -> Self {
        Self {
            handle: entity.clone(),
            any: entity.clone(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.handle.borrow().entity_id()
    }

    pub fn handle(&self) -> &EntityHandle {
        &self.handle
    }

    /// Recovers the concrete entity type behind this reference.
    pub fn downcast<T: 'static>(&self) -> Option<Rc<RefCell<T>>> {
        Rc::downcast::<RefCell<T>>(self.any.clone()).ok()
    }

    pub fn points_to<T: 'static>(&self, entity: &Rc<RefCell<T>>) -> bool {
        match self.downcast::<T>() {
            Some(target) => Rc::ptr_eq(&target, entity),
            None => false,
        }
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({})", self.id())
    }
}

/// The value of a single tracked field at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(DateTime<Utc>),
    Ref(EntityRef),
    RefList(Vec<EntityRef>),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Date(_) => "date",
            FieldValue::Ref(_) => "ref",
            FieldValue::RefList(_) => "ref list",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{:?}", v),
            FieldValue::Date(v) => write!(f, "{}", v.to_rfc3339()),
            FieldValue::Ref(v) => write!(f, "{}", v.id()),
            FieldValue::RefList(v) => {
                write!(f, "[")?;
                for (i, entity_ref) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", entity_ref.id())?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Conversion from a concrete field type into a [`FieldValue`].
///
/// Implemented for every field type the `tracked_fields!` marker accepts.
pub trait IntoFieldValue {
    fn into_field_value(&self) -> FieldValue;
}

/// Conversion from a [`FieldValue`] back into a concrete field type, used by
/// the replay write-back path. Returns `None` on a shape mismatch.
pub trait FromFieldValue: Sized {
    const KIND: &'static str;

    fn from_field_value(value: FieldValue) -> Option<Self>;
}

impl IntoFieldValue for bool {
    fn into_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

impl FromFieldValue for bool {
    const KIND: &'static str = "bool";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl IntoFieldValue for i64 {
    fn into_field_value(&self) -> FieldValue {
        FieldValue::Int(*self)
    }
}

impl FromFieldValue for i64 {
    const KIND: &'static str = "int";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl IntoFieldValue for f64 {
    fn into_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl FromFieldValue for f64 {
    const KIND: &'static str = "float";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl IntoFieldValue for String {
    fn into_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl FromFieldValue for String {
    const KIND: &'static str = "text";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl IntoFieldValue for Option<String> {
    fn into_field_value(&self) -> FieldValue {
        match self {
            Some(v) => FieldValue::Text(v.clone()),
            None => FieldValue::Null,
        }
    }
}

impl FromFieldValue for Option<String> {
    const KIND: &'static str = "text or null";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(v) => Some(Some(v)),
            FieldValue::Null => Some(None),
            _ => None,
        }
    }
}

impl IntoFieldValue for DateTime<Utc> {
    fn into_field_value(&self) -> FieldValue {
        FieldValue::Date(*self)
    }
}

impl FromFieldValue for DateTime<Utc> {
    const KIND: &'static str = "date";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Date(v) => Some(v),
            _ => None,
        }
    }
}

impl IntoFieldValue for EntityRef {
    fn into_field_value(&self) -> FieldValue {
        FieldValue::Ref(self.clone())
    }
}

impl FromFieldValue for EntityRef {
    const KIND: &'static str = "ref";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Ref(v) => Some(v),
            _ => None,
        }
    }
}

impl IntoFieldValue for Option<EntityRef> {
    fn into_field_value(&self) -> FieldValue {
        match self {
            Some(v) => FieldValue::Ref(v.clone()),
            None => FieldValue::Null,
        }
    }
}

impl FromFieldValue for Option<EntityRef> {
    const KIND: &'static str = "ref or null";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Ref(v) => Some(Some(v)),
            FieldValue::Null => Some(None),
            _ => None,
        }
    }
}

impl IntoFieldValue for Vec<EntityRef> {
    fn into_field_value(&self) -> FieldValue {
        FieldValue::RefList(self.clone())
    }
}

impl FromFieldValue for Vec<EntityRef> {
    const KIND: &'static str = "ref list";

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::RefList(v) => Some(v),
            _ => None,
        }
    }
}
