//! The structural selector engine: one generalized pick/omit.
//!
//! Given a source schema and a key selection, the engine walks the source's
//! variant tree and produces the derived schema. It is a total function:
//! every dispatch arm yields a defined result, including the unresolved-
//! reference case (a deferred [`ComputedSchema`]) and the non-structural
//! fallback (the empty object).

use serde_json::Value;

use crate::keys::KeySelector;
use crate::mapped;
use crate::schema::{
    object, ComputedSchema, IntersectSchema, ObjectSchema, RecursiveSchema, Schema, UnionSchema,
};
use crate::types::{Key, Metadata, ObjectOptions, Properties, SelectMode};
use crate::wire;

/// Option keys never copied across a transformation: the source's identity
/// and its transform-state marker. The structural `properties`/`required`
/// fields are typed and rebuilt, so they have no entry here.
const DISCARDED_OPTION_KEYS: &[&str] = &["$id", "$transform"];

/// Constructs a schema whose keys are picked from the given schema.
pub fn pick(source: &Schema, selector: impl Into<KeySelector>) -> Schema {
    select(SelectMode::Keep, source, selector, &Metadata::new())
}

/// [`pick`] with an options record merged into the result node.
pub fn pick_with(source: &Schema, selector: impl Into<KeySelector>, options: &Metadata) -> Schema {
    select(SelectMode::Keep, source, selector, options)
}

/// Constructs a schema whose keys are omitted from the given schema.
pub fn omit(source: &Schema, selector: impl Into<KeySelector>) -> Schema {
    select(SelectMode::Drop, source, selector, &Metadata::new())
}

/// [`omit`] with an options record merged into the result node.
pub fn omit_with(source: &Schema, selector: impl Into<KeySelector>, options: &Metadata) -> Schema {
    select(SelectMode::Drop, source, selector, options)
}

/// Generalized selection over a source schema.
///
/// Dispatch precedence:
/// 1. Mapped forms (a mapped-result source, or a mapped-key selector) are
///    routed to the mapping engine and its result returned verbatim.
/// 2. An unresolved reference on either side defers the whole application
///    as a `Computed` node carrying `[source, key-schema]`.
/// 3. Otherwise the source variant is resolved eagerly: the recursive
///    wrapper is preserved, unions and intersections distribute member-wise,
///    objects filter their properties, and any other shape resolves to the
///    empty object.
pub fn select(
    mode: SelectMode,
    source: &Schema,
    selector: impl Into<KeySelector>,
    options: &Metadata,
) -> Schema {
    let selector = selector.into();
    dispatch(mode, source, &selector, options)
}

fn dispatch(mode: SelectMode, source: &Schema, selector: &KeySelector, options: &Metadata) -> Schema {
    if let Schema::MappedResult(result) = source {
        return mapped::select_from_mapped_result(mode, result, selector, options);
    }
    if let Some(Schema::MappedKey(mapped_key)) = selector.as_schema() {
        return mapped::select_from_mapped_key(mode, source, mapped_key, options);
    }

    // A reference on either side (or both) means the resulting shape cannot
    // be determined yet. Record the application for a later resolution pass.
    let source_is_ref = matches!(source, Schema::Ref(_));
    let selector_is_ref = matches!(selector.as_schema(), Some(Schema::Ref(_)));
    if source_is_ref || selector_is_ref {
        return Schema::Computed(ComputedSchema {
            operator: mode.operator().to_string(),
            operands: vec![source.clone(), selector.key_schema()],
            metadata: options.clone(),
        });
    }

    apply_options(resolve(mode, source, selector), options)
}

fn resolve(mode: SelectMode, source: &Schema, selector: &KeySelector) -> Schema {
    match source {
        // The wrapper is preserved; only the inner shape is transformed.
        Schema::Recursive(r) => Schema::Recursive(RecursiveSchema {
            inner: Box::new(dispatch(mode, &r.inner, selector, &Metadata::new())),
            metadata: r.metadata.clone(),
        }),
        Schema::Intersect(i) => Schema::Intersect(IntersectSchema {
            members: i
                .members
                .iter()
                .map(|member| dispatch(mode, member, selector, &Metadata::new()))
                .collect(),
            metadata: i.metadata.clone(),
        }),
        Schema::Union(u) => Schema::Union(UnionSchema {
            members: u
                .members
                .iter()
                .map(|member| dispatch(mode, member, selector, &Metadata::new()))
                .collect(),
            metadata: u.metadata.clone(),
        }),
        Schema::Object(o) => from_object(mode, o, &selector.key_list()),
        // No other shape has properties to select from: the empty object is
        // the defined fallback, never an error.
        Schema::Ref(_)
        | Schema::Literal(_)
        | Schema::Computed(_)
        | Schema::MappedKey(_)
        | Schema::MappedResult(_)
        | Schema::Other(_) => object(Properties::new()),
    }
}

fn from_object(mode: SelectMode, source: &ObjectSchema, keys: &[Key]) -> Schema {
    let properties: Properties = match mode {
        SelectMode::Keep => source
            .properties
            .iter()
            .filter(|&(key, _)| keys.contains(key))
            .map(|(key, property)| (key.clone(), property.clone()))
            .collect(),
        SelectMode::Drop => source
            .properties
            .iter()
            .filter(|&(key, _)| !keys.contains(key))
            .map(|(key, property)| (key.clone(), property.clone()))
            .collect(),
    };
    Schema::Object(ObjectSchema {
        properties,
        options: copied_options(&source.options),
    })
}

/// Copy object options across a transformation, minus the fixed exclusion
/// set. The required set is derived from the new properties, so there is no
/// stale value to strip.
fn copied_options(options: &ObjectOptions) -> ObjectOptions {
    let mut copied = options.clone();
    for key in DISCARDED_OPTION_KEYS {
        copied.extra.remove(*key);
    }
    copied
}

/// Merge a caller-supplied options record into a freshly built node.
fn apply_options(mut schema: Schema, options: &Metadata) -> Schema {
    if options.is_empty() {
        return schema;
    }
    match &mut schema {
        Schema::Object(o) => {
            for (key, value) in options {
                merge_object_option(&mut o.options, key, value);
            }
        }
        Schema::Union(u) => extend(&mut u.metadata, options),
        Schema::Intersect(i) => extend(&mut i.metadata, options),
        Schema::Recursive(r) => extend(&mut r.metadata, options),
        Schema::Ref(r) => extend(&mut r.metadata, options),
        Schema::Literal(l) => extend(&mut l.metadata, options),
        Schema::Computed(c) => extend(&mut c.metadata, options),
        Schema::Other(map) => {
            for (key, value) in options {
                map.insert(key.clone(), value.clone());
            }
        }
        // Mapped intermediates carry no options of their own.
        Schema::MappedKey(_) | Schema::MappedResult(_) => {}
    }
    schema
}

fn extend(metadata: &mut Metadata, options: &Metadata) {
    for (key, value) in options {
        metadata.insert(key.clone(), value.clone());
    }
}

/// Recognized object options are lifted into their typed fields; structural
/// fields are ignored (they are rebuilt, not configured); everything else
/// passes through as opaque metadata.
fn merge_object_option(options: &mut ObjectOptions, key: &str, value: &Value) {
    match key {
        "type" | "properties" | "required" => {}
        "additionalProperties" => match wire::additional_properties_from_value(value) {
            Some(constraint) => options.additional_properties = Some(constraint),
            None => {
                options.extra.insert(key.to_string(), value.clone());
            }
        },
        "minProperties" => match value.as_u64() {
            Some(bound) => options.min_properties = Some(bound),
            None => {
                options.extra.insert(key.to_string(), value.clone());
            }
        },
        "maxProperties" => match value.as_u64() {
            Some(bound) => options.max_properties = Some(bound),
            None => {
                options.extra.insert(key.to_string(), value.clone());
            }
        },
        _ => {
            options.extra.insert(key.to_string(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        intersect, literal, object_with, recursive, reference, string, union,
    };
    use crate::types::{optional, AdditionalProperties, Property};
    use serde_json::json;

    fn user_schema() -> Schema {
        let mut properties = Properties::new();
        properties.insert("a".into(), string().into());
        properties.insert("b".into(), optional(string()));
        properties.insert("c".into(), string().into());
        object(properties)
    }

    fn object_of(schema: Schema) -> ObjectSchema {
        match schema {
            Schema::Object(object) => object,
            other => panic!("expected object, got {}", other.kind()),
        }
    }

    // === Object Filtering Tests ===

    #[test]
    fn pick_keeps_selected_properties() {
        let picked = object_of(pick(&user_schema(), vec!["a", "b"]));
        let keys: Vec<_> = picked.properties.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b")]);
        assert_eq!(picked.required_keys(), vec![Key::from("a")]);
    }

    #[test]
    fn omit_removes_selected_properties() {
        let remainder = object_of(omit(&user_schema(), vec!["a"]));
        let keys: Vec<_> = remainder.properties.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("b"), Key::from("c")]);
        assert_eq!(remainder.required_keys(), vec![Key::from("c")]);
    }

    #[test]
    fn unknown_selector_keys_are_ignored() {
        let picked = object_of(pick(&user_schema(), vec!["z"]));
        assert!(picked.properties.is_empty());
        assert!(picked.required_keys().is_empty());

        let remainder = object_of(omit(&user_schema(), vec!["z"]));
        assert_eq!(remainder.properties.len(), 3);
    }

    #[test]
    fn pick_with_empty_selector_is_empty_object() {
        let picked = object_of(pick(&user_schema(), Vec::<Key>::new()));
        assert!(picked.properties.is_empty());
    }

    #[test]
    fn omit_with_empty_selector_keeps_all_properties() {
        let remainder = object_of(omit(&user_schema(), Vec::<Key>::new()));
        assert_eq!(remainder.properties.len(), 3);
        assert_eq!(
            remainder.required_keys(),
            vec![Key::from("a"), Key::from("c")]
        );
    }

    #[test]
    fn pick_preserves_source_property_order() {
        // Selector order does not reorder the result.
        let picked = object_of(pick(&user_schema(), vec!["c", "a"]));
        let keys: Vec<_> = picked.properties.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("a"), Key::from("c")]);
    }

    // === Options Handling Tests ===

    #[test]
    fn options_copy_discards_identity_and_transform_marker() {
        let mut properties = Properties::new();
        properties.insert("a".into(), string().into());
        properties.insert("b".into(), string().into());
        let mut options = ObjectOptions {
            additional_properties: Some(AdditionalProperties::Allowed(false)),
            min_properties: Some(1),
            max_properties: Some(4),
            extra: Metadata::new(),
        };
        options.extra.insert("$id".into(), json!("urn:user"));
        options.extra.insert("$transform".into(), json!("decode"));
        options.extra.insert("description".into(), json!("a user"));
        let source = object_with(properties, options);

        let picked = object_of(pick(&source, vec!["a"]));
        assert!(!picked.options.extra.contains_key("$id"));
        assert!(!picked.options.extra.contains_key("$transform"));
        assert_eq!(picked.options.extra.get("description"), Some(&json!("a user")));
        assert_eq!(
            picked.options.additional_properties,
            Some(AdditionalProperties::Allowed(false))
        );
        assert_eq!(picked.options.min_properties, Some(1));
        assert_eq!(picked.options.max_properties, Some(4));
    }

    #[test]
    fn supplied_options_merge_into_result() {
        let mut options = Metadata::new();
        options.insert("description".into(), json!("picked"));
        options.insert("minProperties".into(), json!(1));
        let picked = object_of(pick_with(&user_schema(), vec!["a"], &options));
        assert_eq!(picked.options.extra.get("description"), Some(&json!("picked")));
        assert_eq!(picked.options.min_properties, Some(1));
    }

    #[test]
    fn supplied_options_attach_to_deferred_node() {
        let mut options = Metadata::new();
        options.insert("description".into(), json!("deferred"));
        let deferred = pick_with(&reference("User"), vec!["a"], &options);
        let Schema::Computed(computed) = deferred else {
            panic!("expected computed node");
        };
        assert_eq!(computed.metadata.get("description"), Some(&json!("deferred")));
    }

    // === Composite Dispatch Tests ===

    #[test]
    fn union_distributes_member_wise() {
        let mut left = Properties::new();
        left.insert("a".into(), string().into());
        left.insert("b".into(), string().into());
        let mut right = Properties::new();
        right.insert("a".into(), string().into());
        right.insert("c".into(), string().into());
        let source = union(vec![object(left.clone()), object(right.clone())]);

        let expected = union(vec![
            omit(&object(left), vec!["a"]),
            omit(&object(right), vec!["a"]),
        ]);
        assert_eq!(omit(&source, vec!["a"]), expected);
    }

    #[test]
    fn intersect_distributes_member_wise() {
        let source = intersect(vec![user_schema(), user_schema()]);
        let expected = intersect(vec![
            pick(&user_schema(), vec!["a"]),
            pick(&user_schema(), vec!["a"]),
        ]);
        assert_eq!(pick(&source, vec!["a"]), expected);
    }

    #[test]
    fn recursive_wrapper_is_preserved() {
        let source = recursive(user_schema());
        let result = pick(&source, vec!["a"]);
        let Schema::Recursive(r) = result else {
            panic!("expected recursive wrapper");
        };
        assert_eq!(*r.inner, pick(&user_schema(), vec!["a"]));
    }

    #[test]
    fn symbolic_member_inside_union_defers_locally() {
        let source = union(vec![user_schema(), reference("Other")]);
        let Schema::Union(u) = pick(&source, vec!["a"]) else {
            panic!("expected union");
        };
        assert!(matches!(u.members[0], Schema::Object(_)));
        assert!(matches!(u.members[1], Schema::Computed(_)));
    }

    // === Deferral Tests ===

    #[test]
    fn ref_source_defers_with_key_schema_operand() {
        let source = reference("User");
        let deferred = pick(&source, vec!["a", "b"]);
        let Schema::Computed(computed) = deferred else {
            panic!("expected computed node");
        };
        assert_eq!(computed.operator, "Pick");
        assert_eq!(computed.operands[0], source);
        assert_eq!(
            computed.operands[1],
            union(vec![literal("a"), literal("b")])
        );
    }

    #[test]
    fn ref_selector_defers_even_with_concrete_source() {
        let selector = reference("Keys");
        let deferred = omit(&user_schema(), &selector);
        let Schema::Computed(computed) = deferred else {
            panic!("expected computed node");
        };
        assert_eq!(computed.operator, "Omit");
        assert_eq!(computed.operands[0], user_schema());
        assert_eq!(computed.operands[1], selector);
    }

    #[test]
    fn ref_on_both_sides_defers() {
        let deferred = pick(&reference("User"), &reference("Keys"));
        assert!(matches!(deferred, Schema::Computed(_)));
    }

    // === Fallback Tests ===

    #[test]
    fn non_structural_source_resolves_to_empty_object() {
        let picked = object_of(pick(&string(), vec!["a"]));
        assert!(picked.properties.is_empty());

        let picked = object_of(pick(&literal("x"), vec!["a"]));
        assert!(picked.properties.is_empty());
    }

    #[test]
    fn computed_source_resolves_to_empty_object() {
        let source = crate::schema::computed("Pick", vec![reference("User")]);
        let picked = object_of(pick(&source, vec!["a"]));
        assert!(picked.properties.is_empty());
    }

    // === Selector-As-Schema Tests ===

    #[test]
    fn schema_selector_uses_enumerable_keys() {
        let mut selector_properties = Properties::new();
        selector_properties.insert("a".into(), string().into());
        selector_properties.insert("b".into(), string().into());
        let selector = object(selector_properties);

        let picked = object_of(pick(&user_schema(), &selector));
        let keys: Vec<_> = picked.properties.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b")]);
    }

    #[test]
    fn modifier_flags_survive_selection() {
        let picked = object_of(pick(&user_schema(), vec!["b"]));
        let property: &Property = &picked.properties[&Key::from("b")];
        assert!(property.optional);
    }
}
