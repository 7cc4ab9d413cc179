//! Structural schema descriptors with pick/omit derivation.
//!
//! This library builds immutable structural type descriptors ("schemas")
//! that mirror JSON-Schema semantics: object shapes with named properties,
//! required/optional/readonly modifiers, unions, intersections, and
//! recursive definitions. New shapes are derived from existing ones by key
//! selection, without re-declaring properties by hand.
//!
//! The selector engine is a total function: when a source or selector is an
//! unresolved symbolic reference, the application is recorded as a deferred
//! [`ComputedSchema`] node for a later resolution pass instead of failing.
//!
//! # Example
//!
//! ```
//! use typeshape::{object, omit, optional, pick, string, Key, Properties, Schema};
//!
//! let mut props = Properties::new();
//! props.insert("id".into(), string().into());
//! props.insert("name".into(), string().into());
//! props.insert("note".into(), optional(string()));
//! let user = object(props);
//!
//! let summary = pick(&user, vec!["id", "name"]);
//! let Schema::Object(summary) = summary else { unreachable!() };
//! assert_eq!(
//!     summary.required_keys(),
//!     vec![Key::from("id"), Key::from("name")]
//! );
//!
//! let rest = omit(&user, vec!["id", "name"]);
//! let Schema::Object(rest) = rest else { unreachable!() };
//! assert!(rest.required_keys().is_empty());
//! ```
//!
//! # Modifier Semantics
//!
//! | modifier | effect on the property | effect on `required` |
//! |----------|------------------------|----------------------|
//! | (none) | kept as-is | key present |
//! | `optional` | kept as-is | key absent |
//! | `readonly` | serialized with `readOnly: true` | unchanged |
//!
//! The required set is always derived from the modifier flags, never stored,
//! so a transformation can never leave it stale.

mod error;
mod keys;
mod loader;
mod mapped;
mod schema;
mod select;
mod types;
mod wire;

pub use error::SchemaError;
pub use keys::{index_property_keys, KeySelector};
pub use loader::{load_schema, load_schema_str};
pub use schema::{
    boolean, computed, integer, intersect, literal, null, number, object, object_with, recursive,
    reference, string, union, ComputedSchema, IntersectSchema, LiteralSchema, MappedKeySchema,
    MappedResultSchema, ObjectSchema, RecursiveSchema, RefSchema, Schema, UnionSchema,
};
pub use select::{omit, omit_with, pick, pick_with, select};
pub use types::{
    optional, readonly, AdditionalProperties, Key, LiteralValue, Metadata, ObjectOptions,
    Properties, Property, SelectMode,
};
pub use wire::{schema_from_value, schema_to_value};
