use crate::value::FieldValue;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Stable identity of a tracked entity, assigned at construction.
pub type EntityId = Uuid;

/// Shared handle to a tracked entity. The engine and the domain graph both
/// hold handles; the engine never takes exclusive ownership.
pub type EntityHandle = Rc<RefCell<dyn Trackable>>;

/// Registered entities with their ids, in registration order. Ids are kept
/// alongside the handles so membership checks never need to borrow the
/// entities themselves.
pub(crate) type EntitySet = Vec<(EntityId, EntityHandle)>;

/// The generated per-type surface over an entity's tracked fields.
///
/// Implemented by the [`tracked_fields!`](crate::tracked_fields) marker, not
/// by hand. Fields not listed in the marker are invisible to the engine.
pub trait TrackedFields {
    /// Names of the tracked fields, in declaration order.
    fn tracked_fields(&self) -> &'static [&'static str];

    /// Reads the current value of a tracked field, `None` if unknown.
    fn read_field(&self, name: &str) -> Option<FieldValue>;

    /// Writes a value directly into a tracked field, bypassing the entity's
    /// mutators. This is the privileged replay path; domain code must never
    /// call it.
    fn write_field(&mut self, name: &str, value: FieldValue) -> crate::Result<()>;
}

/// An entity that can participate in change tracking.
pub trait Trackable: TrackedFields {
    fn entity_id(&self) -> EntityId;
}

/// Marks the tracked fields of an entity type.
///
/// Generates the [`TrackedFields`] implementation: field enumeration, value
/// reads for diffing, and the direct write-back used during replay. The
/// entity author implements [`Trackable`] (the id accessor) separately and
/// keeps writing ordinary mutators; those mutators just have to end with a
/// `HistoryManager::commit` call.
///
/// ```ignore
/// struct Task {
///     id: EntityId,
///     name: String,
///     done: bool,
/// }
///
/// entrack_core::tracked_fields!(Task {
///     name: String,
///     done: bool,
/// });
/// ```
#[macro_export]
macro_rules! tracked_fields {
    ($entity:ty { $($field:ident: $fty:ty),+ $(,)? }) => {
        impl $crate::entity::TrackedFields for $entity {
            fn tracked_fields(&self) -> &'static [&'static str] {
                &[$(stringify!($field)),+]
            }

            fn read_field(&self, name: &str) -> Option<$crate::FieldValue> {
                match name {
                    $(
                        stringify!($field) => {
                            Some($crate::value::IntoFieldValue::into_field_value(
                                &self.$field,
                            ))
                        }
                    )+
                    _ => None,
                }
            }

            fn write_field(
                &mut self,
                name: &str,
                value: $crate::FieldValue,
            ) -> $crate::Result<()> {
                match name {
                    $(
                        stringify!($field) => {
                            let actual = value.kind();
                            self.$field =
                                <$fty as $crate::value::FromFieldValue>::from_field_value(value)
                                    .ok_or_else(|| $crate::Error::TypeMismatch {
                                        field: stringify!($field).to_string(),
                                        expected:
                                            <$fty as $crate::value::FromFieldValue>::KIND,
                                        actual,
                                    })?;
                            Ok(())
                        }
                    )+
                    _ => Err($crate::Error::UnknownField(name.to_string())),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    struct Widget {
        id: EntityId,
        label: String,
        count: i64,
    }

    crate::tracked_fields!(Widget {
        label: String,
        count: i64,
    });

    impl Trackable for Widget {
        fn entity_id(&self) -> EntityId {
            self.id
        }
    }

    fn widget() -> Widget {
        Widget {
            id: Uuid::new_v4(),
            label: "a".into(),
            count: 1,
        }
    }

    #[test]
    fn test_marker_enumerates_declared_fields_only() {
        let w = widget();
        assert_eq!(w.tracked_fields(), &["label", "count"]);
        assert!(w.read_field("id").is_none());
    }

    #[test]
    fn test_read_and_write_field() {
        let mut w = widget();
        assert_eq!(w.read_field("label"), Some(FieldValue::Text("a".into())));

        w.write_field("count", FieldValue::Int(7)).unwrap();
        assert_eq!(w.count, 7);
    }

    #[test]
    fn test_write_field_rejects_wrong_shape() {
        let mut w = widget();
        let err = w
            .write_field("count", FieldValue::Text("seven".into()))
            .unwrap_err();
        assert!(matches!(err, crate::Error::TypeMismatch { .. }));

        let err = w.write_field("missing", FieldValue::Int(0)).unwrap_err();
        assert!(matches!(err, crate::Error::UnknownField(_)));
    }
}
