//! Core value types: property keys, literal values, modifier flags and
//! object options.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::schema::Schema;

/// Opaque metadata carried on schema nodes (`description`, `default`, `$id`,
/// ...). Copied through transformations unchanged, never interpreted.
pub type Metadata = Map<String, Value>;

/// An ordered property map. Insertion order is preserved for serialization;
/// inserting an existing key replaces its property (last write wins) without
/// moving it.
pub type Properties = IndexMap<Key, Property>;

/// A property key: a string or integer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl Key {
    /// The literal value carried by this key, used when a key list must be
    /// expressed as a union of literal schemas.
    pub(crate) fn to_literal(&self) -> LiteralValue {
        match self {
            Key::Str(s) => LiteralValue::Str(s.clone()),
            Key::Int(i) => LiteralValue::Int(*i),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

/// A single scalar value carried by a literal schema.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Num(f64),
    Str(String),
}

impl LiteralValue {
    /// The key this literal names, if it is a valid property key.
    /// Boolean and fractional literals do not name keys.
    pub fn as_key(&self) -> Option<Key> {
        match self {
            LiteralValue::Str(s) => Some(Key::Str(s.clone())),
            LiteralValue::Int(i) => Some(Key::Int(*i)),
            LiteralValue::Bool(_) | LiteralValue::Num(_) => None,
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Int(i) => Value::Number((*i).into()),
            LiteralValue::Num(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            LiteralValue::Str(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::Str(s.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::Str(s)
    }
}

impl From<i64> for LiteralValue {
    fn from(i: i64) -> Self {
        LiteralValue::Int(i)
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Num(n)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Bool(b)
    }
}

/// A property's schema plus its modifier flags.
///
/// `optional` and `readonly` are orthogonal flags, not nested wrapper
/// shapes: a property is always exactly one underlying schema with zero or
/// more flags set.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub schema: Schema,
    pub optional: bool,
    pub readonly: bool,
}

impl Property {
    /// A required, writable property.
    pub fn new(schema: Schema) -> Self {
        Property {
            schema,
            optional: false,
            readonly: false,
        }
    }
}

impl From<Schema> for Property {
    fn from(schema: Schema) -> Self {
        Property::new(schema)
    }
}

/// Mark a property as optional. Composes with [`readonly`] in either order.
pub fn optional(property: impl Into<Property>) -> Property {
    let mut property = property.into();
    property.optional = true;
    property
}

/// Mark a property as readonly. Composes with [`optional`] in either order.
pub fn readonly(property: impl Into<Property>) -> Property {
    let mut property = property.into();
    property.readonly = true;
    property
}

/// The `additionalProperties` constraint on an object schema: a boolean
/// switch or a schema constraining extra properties.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// Options recognized by the object constructor and propagated by pick/omit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectOptions {
    /// Constraint on properties not named in the property map.
    pub additional_properties: Option<AdditionalProperties>,
    /// The minimum number of properties allowed on this object.
    pub min_properties: Option<u64>,
    /// The maximum number of properties allowed on this object.
    pub max_properties: Option<u64>,
    /// Opaque metadata, copied through unchanged.
    pub extra: Metadata,
}

/// Whether the selector keys are kept (pick) or dropped (omit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectMode {
    Keep,
    Drop,
}

impl SelectMode {
    /// Operator name recorded on deferred nodes.
    pub fn operator(self) -> &'static str {
        match self {
            SelectMode::Keep => "Pick",
            SelectMode::Drop => "Omit",
        }
    }
}
