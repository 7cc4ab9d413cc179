//! Routing for the mapped-key and mapped-result intermediate forms.
//!
//! These forms are produced by an external key-mapping engine. The selector
//! engine recognizes them and routes each mapped entry through a single-key
//! selection, but never resolves the mapping itself; the results are
//! returned verbatim as mapped-result nodes.

use crate::keys::KeySelector;
use crate::schema::{MappedKeySchema, MappedResultSchema, Schema};
use crate::select::select;
use crate::types::{Metadata, SelectMode};

/// One single-key selection per mapped key, collected into a mapped result.
pub(crate) fn select_from_mapped_key(
    mode: SelectMode,
    source: &Schema,
    mapped_key: &MappedKeySchema,
    options: &Metadata,
) -> Schema {
    let properties = mapped_key
        .keys
        .iter()
        .map(|key| (key.clone(), select(mode, source, vec![key.clone()], options)))
        .collect();
    Schema::MappedResult(MappedResultSchema { properties })
}

/// Apply the selection to each property of a mapped result.
pub(crate) fn select_from_mapped_result(
    mode: SelectMode,
    result: &MappedResultSchema,
    selector: &KeySelector,
    options: &Metadata,
) -> Schema {
    let properties = result
        .properties
        .iter()
        .map(|(key, schema)| (key.clone(), select(mode, schema, selector.clone(), options)))
        .collect();
    Schema::MappedResult(MappedResultSchema { properties })
}
