//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**; two instances
/// with the same attribute values are the same value. A per-line tax
/// breakdown is a value object; an invoice (which has identity and a
/// lifecycle) is not.
///
/// To "modify" a value object, build a new one. This keeps frozen fiscal
/// amounts trivially shareable and prevents accidental in-place edits.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
