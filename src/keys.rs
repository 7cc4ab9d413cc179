//! Key-selector normalization and the enumerable-keys capability.
//!
//! A selection criterion arrives either as an explicit key list or as a
//! schema that enumerates keys. The engine needs both canonical forms: the
//! key list to filter an object's properties, and a key-schema (a union of
//! literals) when the selection must be recorded symbolically on a deferred
//! node.

use crate::schema::{literal, union, Schema};
use crate::types::Key;

/// A key-selection criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySelector {
    /// An explicit ordered sequence of keys.
    Keys(Vec<Key>),
    /// A schema whose enumerable property keys form the selection.
    Schema(Box<Schema>),
}

impl KeySelector {
    /// Canonical key-list form, used to filter object properties.
    pub fn key_list(&self) -> Vec<Key> {
        match self {
            KeySelector::Keys(keys) => keys.clone(),
            KeySelector::Schema(schema) => index_property_keys(schema),
        }
    }

    /// Key-schema form, used when the selection must be expressed
    /// symbolically. An explicit key list becomes a union of single-value
    /// literals; a schema selector is used verbatim.
    pub fn key_schema(&self) -> Schema {
        match self {
            KeySelector::Keys(keys) => union_of_keys(keys),
            KeySelector::Schema(schema) => (**schema).clone(),
        }
    }

    pub(crate) fn as_schema(&self) -> Option<&Schema> {
        match self {
            KeySelector::Schema(schema) => Some(schema.as_ref()),
            KeySelector::Keys(_) => None,
        }
    }
}

impl From<Vec<Key>> for KeySelector {
    fn from(keys: Vec<Key>) -> Self {
        KeySelector::Keys(keys)
    }
}

impl From<Vec<&str>> for KeySelector {
    fn from(keys: Vec<&str>) -> Self {
        KeySelector::Keys(keys.into_iter().map(Key::from).collect())
    }
}

impl From<Schema> for KeySelector {
    fn from(schema: Schema) -> Self {
        KeySelector::Schema(Box::new(schema))
    }
}

impl From<&Schema> for KeySelector {
    fn from(schema: &Schema) -> Self {
        KeySelector::Schema(Box::new(schema.clone()))
    }
}

/// Wrap each key in a single-value literal schema and combine them into a
/// union. Every [`Key`] is a concrete literal, so none are skipped.
fn union_of_keys(keys: &[Key]) -> Schema {
    union(keys.iter().map(|key| literal(key.to_literal())).collect())
}

/// The enumerable property keys of a schema.
///
/// - Object: its property keys, in order.
/// - Union: keys present in every member (a value of the union is only
///   guaranteed to have the shared keys), ordered by the first member.
/// - Intersect: the set-union of member keys, in first-seen order.
/// - Recursive: the keys of the inner shape.
/// - Literal: the single key it names, when it names one.
/// - MappedKey: its key list.
/// - Anything else enumerates no keys.
pub fn index_property_keys(schema: &Schema) -> Vec<Key> {
    match schema {
        Schema::Object(object) => object.properties.keys().cloned().collect(),
        Schema::Union(u) => {
            let mut members = u.members.iter();
            let Some(first) = members.next() else {
                return Vec::new();
            };
            let mut keys = index_property_keys(first);
            for member in members {
                let member_keys = index_property_keys(member);
                keys.retain(|key| member_keys.contains(key));
            }
            keys
        }
        Schema::Intersect(i) => {
            let mut keys: Vec<Key> = Vec::new();
            for member in &i.members {
                for key in index_property_keys(member) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
            keys
        }
        Schema::Recursive(r) => index_property_keys(&r.inner),
        Schema::Literal(l) => l.value.as_key().into_iter().collect(),
        Schema::MappedKey(m) => m.keys.clone(),
        Schema::Ref(_)
        | Schema::Computed(_)
        | Schema::MappedResult(_)
        | Schema::Other(_) => Vec::new(),
    }
}
