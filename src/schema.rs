//! The schema node model: a closed sum over every shape the selector engine
//! dispatches on.
//!
//! All nodes are immutable values. Transformations never mutate their
//! inputs; they clone what they keep and build new nodes around it, so a
//! child schema may be shared by any number of parents.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::types::{Key, LiteralValue, Metadata, ObjectOptions, Properties};

/// A structural type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// An object shape with named properties.
    Object(ObjectSchema),
    /// A logical OR over an ordered sequence of member schemas.
    Union(UnionSchema),
    /// A logical AND over an ordered sequence of member schemas.
    Intersect(IntersectSchema),
    /// A self-referential wrapper; the inner shape may reference the
    /// wrapper by identity.
    Recursive(RecursiveSchema),
    /// A symbolic reference, not yet resolved to a concrete shape.
    Ref(RefSchema),
    /// A single scalar value, used to represent individual keys.
    Literal(LiteralSchema),
    /// A deferred operator application awaiting a later resolution pass.
    Computed(ComputedSchema),
    /// Intermediate form produced by the external key-mapping engine.
    MappedKey(MappedKeySchema),
    /// Intermediate form produced by the external key-mapping engine.
    MappedResult(MappedResultSchema),
    /// Any non-structural schema (`{"type": "string"}` and friends),
    /// carried verbatim and never interpreted by the core.
    Other(Map<String, Value>),
}

impl Schema {
    /// Variant tag name, used in error messages and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Schema::Object(_) => "object",
            Schema::Union(_) => "union",
            Schema::Intersect(_) => "intersect",
            Schema::Recursive(_) => "recursive",
            Schema::Ref(_) => "ref",
            Schema::Literal(_) => "literal",
            Schema::Computed(_) => "computed",
            Schema::MappedKey(_) => "mapped-key",
            Schema::MappedResult(_) => "mapped-result",
            Schema::Other(_) => "other",
        }
    }
}

/// An object shape: an ordered property map plus constructor options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: Properties,
    pub options: ObjectOptions,
}

impl ObjectSchema {
    /// The derived required-key set: every key whose property is not
    /// optional, in property order.
    ///
    /// Computed on demand rather than stored, so it can never go stale
    /// across a transformation. An empty result is serialized as the
    /// absence of the `required` field.
    pub fn required_keys(&self) -> Vec<Key> {
        self.properties
            .iter()
            .filter(|(_, property)| !property.optional)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    pub members: Vec<Schema>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectSchema {
    pub members: Vec<Schema>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecursiveSchema {
    pub inner: Box<Schema>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefSchema {
    /// Identifier of the referenced schema.
    pub target: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralSchema {
    pub value: LiteralValue,
    pub metadata: Metadata,
}

/// A recorded operator application (`"Pick"`, `"Omit"`) whose operands are
/// not yet fully resolvable. Produced by the selector engine when either
/// side of a selection is symbolic; rewritten by a later resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedSchema {
    pub operator: String,
    pub operands: Vec<Schema>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedKeySchema {
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedResultSchema {
    pub properties: IndexMap<Key, Schema>,
}

/// Creates an object schema from a property map.
///
/// Total function: any property map, including the empty map, is valid.
/// The required-key set is derived from the properties' optional flags.
pub fn object(properties: Properties) -> Schema {
    object_with(properties, ObjectOptions::default())
}

/// Creates an object schema from a property map and options.
pub fn object_with(properties: Properties, options: ObjectOptions) -> Schema {
    Schema::Object(ObjectSchema {
        properties,
        options,
    })
}

/// Creates a union over the given member schemas.
pub fn union(members: Vec<Schema>) -> Schema {
    Schema::Union(UnionSchema {
        members,
        metadata: Metadata::new(),
    })
}

/// Creates an intersection over the given member schemas.
pub fn intersect(members: Vec<Schema>) -> Schema {
    Schema::Intersect(IntersectSchema {
        members,
        metadata: Metadata::new(),
    })
}

/// Wraps a schema as self-referential.
pub fn recursive(inner: Schema) -> Schema {
    Schema::Recursive(RecursiveSchema {
        inner: Box::new(inner),
        metadata: Metadata::new(),
    })
}

/// Creates a symbolic reference to a named schema.
pub fn reference(target: impl Into<String>) -> Schema {
    Schema::Ref(RefSchema {
        target: target.into(),
        metadata: Metadata::new(),
    })
}

/// Creates a single-value literal schema.
pub fn literal(value: impl Into<LiteralValue>) -> Schema {
    Schema::Literal(LiteralSchema {
        value: value.into(),
        metadata: Metadata::new(),
    })
}

/// Records a deferred operator application.
pub fn computed(operator: impl Into<String>, operands: Vec<Schema>) -> Schema {
    Schema::Computed(ComputedSchema {
        operator: operator.into(),
        operands,
        metadata: Metadata::new(),
    })
}

fn leaf(type_name: &str) -> Schema {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(type_name.to_string()));
    Schema::Other(map)
}

/// A plain string schema.
pub fn string() -> Schema {
    leaf("string")
}

/// A plain number schema.
pub fn number() -> Schema {
    leaf("number")
}

/// A plain integer schema.
pub fn integer() -> Schema {
    leaf("integer")
}

/// A plain boolean schema.
pub fn boolean() -> Schema {
    leaf("boolean")
}

/// A null schema.
pub fn null() -> Schema {
    leaf("null")
}
