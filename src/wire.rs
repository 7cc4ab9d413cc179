//! The serialized (JSON-Schema) form of schema nodes.
//!
//! Object nodes serialize to standard JSON Schema: `type: "object"`, an
//! ordered `properties` record, a `required` array omitted when empty, the
//! recognized object options, and passthrough metadata. Composite forms use
//! their JSON-Schema spellings (`anyOf`, `allOf`, `$ref`, `const`, and
//! `readOnly` for the readonly modifier); the optional modifier is encoded
//! as absence from the parent's `required` array. Forms with no standard
//! spelling are carried under `$`-prefixed keywords (`$recursive`,
//! `$computed`, `$mappedKey`, `$mappedResult`) so that encoding is total.
//!
//! Decoding collapses integer-valued property keys to strings: the wire
//! form cannot distinguish them.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::schema::{
    ComputedSchema, IntersectSchema, LiteralSchema, MappedKeySchema, MappedResultSchema,
    ObjectSchema, RecursiveSchema, RefSchema, Schema, UnionSchema,
};
use crate::types::{
    AdditionalProperties, Key, LiteralValue, Metadata, ObjectOptions, Properties, Property,
};

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// --- Encoding ---

/// Encode a schema into its serialized form. Total: every variant has a
/// wire spelling.
pub fn schema_to_value(schema: &Schema) -> Value {
    match schema {
        Schema::Object(object) => object_to_value(object),
        Schema::Union(u) => {
            let mut map = Map::new();
            map.insert(
                "anyOf".to_string(),
                Value::Array(u.members.iter().map(schema_to_value).collect()),
            );
            extend(&mut map, &u.metadata);
            Value::Object(map)
        }
        Schema::Intersect(i) => {
            let mut map = Map::new();
            map.insert(
                "allOf".to_string(),
                Value::Array(i.members.iter().map(schema_to_value).collect()),
            );
            extend(&mut map, &i.metadata);
            Value::Object(map)
        }
        Schema::Recursive(r) => {
            let mut map = Map::new();
            map.insert("$recursive".to_string(), schema_to_value(&r.inner));
            extend(&mut map, &r.metadata);
            Value::Object(map)
        }
        Schema::Ref(r) => {
            let mut map = Map::new();
            map.insert("$ref".to_string(), Value::String(r.target.clone()));
            extend(&mut map, &r.metadata);
            Value::Object(map)
        }
        Schema::Literal(l) => {
            let mut map = Map::new();
            map.insert("const".to_string(), l.value.to_value());
            extend(&mut map, &l.metadata);
            Value::Object(map)
        }
        Schema::Computed(c) => {
            let mut record = Map::new();
            record.insert("operator".to_string(), Value::String(c.operator.clone()));
            record.insert(
                "operands".to_string(),
                Value::Array(c.operands.iter().map(schema_to_value).collect()),
            );
            let mut map = Map::new();
            map.insert("$computed".to_string(), Value::Object(record));
            extend(&mut map, &c.metadata);
            Value::Object(map)
        }
        Schema::MappedKey(m) => {
            let mut map = Map::new();
            map.insert(
                "$mappedKey".to_string(),
                Value::Array(m.keys.iter().map(key_to_value).collect()),
            );
            Value::Object(map)
        }
        Schema::MappedResult(m) => {
            let mut record = Map::new();
            for (key, schema) in &m.properties {
                record.insert(key.to_string(), schema_to_value(schema));
            }
            let mut map = Map::new();
            map.insert("$mappedResult".to_string(), Value::Object(record));
            Value::Object(map)
        }
        Schema::Other(map) => Value::Object(map.clone()),
    }
}

fn object_to_value(object: &ObjectSchema) -> Value {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String("object".to_string()));

    let mut properties = Map::new();
    for (key, property) in &object.properties {
        properties.insert(key.to_string(), property_to_value(property));
    }
    map.insert("properties".to_string(), Value::Object(properties));

    let required = object.required_keys();
    if !required.is_empty() {
        map.insert(
            "required".to_string(),
            Value::Array(
                required
                    .iter()
                    .map(|key| Value::String(key.to_string()))
                    .collect(),
            ),
        );
    }

    if let Some(constraint) = &object.options.additional_properties {
        let value = match constraint {
            AdditionalProperties::Allowed(allowed) => Value::Bool(*allowed),
            AdditionalProperties::Schema(schema) => schema_to_value(schema),
        };
        map.insert("additionalProperties".to_string(), value);
    }
    if let Some(bound) = object.options.min_properties {
        map.insert("minProperties".to_string(), Value::Number(bound.into()));
    }
    if let Some(bound) = object.options.max_properties {
        map.insert("maxProperties".to_string(), Value::Number(bound.into()));
    }
    extend(&mut map, &object.options.extra);
    Value::Object(map)
}

fn property_to_value(property: &Property) -> Value {
    let mut value = schema_to_value(&property.schema);
    if property.readonly {
        if let Value::Object(map) = &mut value {
            map.insert("readOnly".to_string(), Value::Bool(true));
        }
    }
    value
}

fn key_to_value(key: &Key) -> Value {
    match key {
        Key::Str(s) => Value::String(s.clone()),
        Key::Int(i) => Value::Number((*i).into()),
    }
}

fn extend(map: &mut Map<String, Value>, metadata: &Metadata) {
    for (key, value) in metadata {
        map.insert(key.clone(), value.clone());
    }
}

// --- Decoding ---

/// Decode a serialized schema.
///
/// # Errors
///
/// Returns `SchemaError::InvalidSchema` with a JSON-Pointer-style path when
/// the value does not spell a schema.
pub fn schema_from_value(value: &Value) -> Result<Schema, SchemaError> {
    decode(value, "#")
}

pub(crate) fn additional_properties_from_value(value: &Value) -> Option<AdditionalProperties> {
    decode_additional_properties(value, "#").ok()
}

fn invalid(path: &str, message: impl Into<String>) -> SchemaError {
    SchemaError::InvalidSchema {
        path: path.to_string(),
        message: message.into(),
    }
}

fn decode(value: &Value, path: &str) -> Result<Schema, SchemaError> {
    let Value::Object(map) = value else {
        return Err(invalid(
            path,
            format!("expected object, got {}", json_type_name(value)),
        ));
    };

    if let Some(inner) = map.get("$recursive") {
        let inner = decode(inner, &format!("{}/$recursive", path))?;
        return Ok(Schema::Recursive(RecursiveSchema {
            inner: Box::new(inner),
            metadata: metadata_except(map, &["$recursive"]),
        }));
    }
    if let Some(record) = map.get("$computed") {
        return decode_computed(map, record, path);
    }
    if let Some(keys) = map.get("$mappedKey") {
        return decode_mapped_key(keys, path);
    }
    if let Some(record) = map.get("$mappedResult") {
        return decode_mapped_result(record, path);
    }
    if let Some(target) = map.get("$ref") {
        let Some(target) = target.as_str() else {
            return Err(invalid(
                &format!("{}/$ref", path),
                format!("expected string, got {}", json_type_name(target)),
            ));
        };
        return Ok(Schema::Ref(RefSchema {
            target: target.to_string(),
            metadata: metadata_except(map, &["$ref"]),
        }));
    }

    let is_object_schema = map.get("type").and_then(Value::as_str) == Some("object")
        || map.contains_key("properties");
    if is_object_schema {
        return decode_object(map, path);
    }

    if let Some(members) = map.get("allOf") {
        return Ok(Schema::Intersect(IntersectSchema {
            members: decode_members(members, "allOf", path)?,
            metadata: metadata_except(map, &["allOf"]),
        }));
    }
    if let Some(members) = map.get("anyOf") {
        return Ok(Schema::Union(UnionSchema {
            members: decode_members(members, "anyOf", path)?,
            metadata: metadata_except(map, &["anyOf"]),
        }));
    }
    if let Some(value) = map.get("const") {
        // Only scalar constants are literals; anything else stays verbatim.
        let literal = match value {
            Value::Bool(b) => Some(LiteralValue::Bool(*b)),
            Value::String(s) => Some(LiteralValue::Str(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(LiteralValue::Int)
                .or_else(|| n.as_f64().map(LiteralValue::Num)),
            _ => None,
        };
        if let Some(value) = literal {
            return Ok(Schema::Literal(LiteralSchema {
                value,
                metadata: metadata_except(map, &["const"]),
            }));
        }
    }

    Ok(Schema::Other(map.clone()))
}

fn decode_members(value: &Value, keyword: &str, path: &str) -> Result<Vec<Schema>, SchemaError> {
    let Value::Array(members) = value else {
        return Err(invalid(
            &format!("{}/{}", path, keyword),
            format!("expected array, got {}", json_type_name(value)),
        ));
    };
    members
        .iter()
        .enumerate()
        .map(|(index, member)| decode(member, &format!("{}/{}/{}", path, keyword, index)))
        .collect()
}

fn decode_object(map: &Map<String, Value>, path: &str) -> Result<Schema, SchemaError> {
    let required: Vec<String> = map
        .get("required")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let mut properties = Properties::new();
    if let Some(value) = map.get("properties") {
        let Value::Object(entries) = value else {
            return Err(invalid(
                &format!("{}/properties", path),
                format!("expected object, got {}", json_type_name(value)),
            ));
        };
        for (name, entry) in entries {
            let property_path = format!("{}/properties/{}", path, name);
            let property = decode_property(entry, &required, name, &property_path)?;
            properties.insert(Key::Str(name.clone()), property);
        }
    }

    let mut options = ObjectOptions::default();
    for (key, value) in map {
        match key.as_str() {
            "type" | "properties" | "required" => {}
            "additionalProperties" => {
                options.additional_properties = Some(decode_additional_properties(
                    value,
                    &format!("{}/additionalProperties", path),
                )?);
            }
            "minProperties" => match value.as_u64() {
                Some(bound) => options.min_properties = Some(bound),
                None => {
                    options.extra.insert(key.clone(), value.clone());
                }
            },
            "maxProperties" => match value.as_u64() {
                Some(bound) => options.max_properties = Some(bound),
                None => {
                    options.extra.insert(key.clone(), value.clone());
                }
            },
            _ => {
                options.extra.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(Schema::Object(ObjectSchema {
        properties,
        options,
    }))
}

fn decode_property(
    value: &Value,
    required: &[String],
    name: &str,
    path: &str,
) -> Result<Property, SchemaError> {
    // readOnly is a modifier flag, not metadata: lift it off the record
    // before decoding the underlying schema.
    let mut readonly = false;
    let schema = match value {
        Value::Object(map) if matches!(map.get("readOnly"), Some(Value::Bool(true))) => {
            readonly = true;
            let mut stripped = map.clone();
            stripped.remove("readOnly");
            decode(&Value::Object(stripped), path)?
        }
        other => decode(other, path)?,
    };
    Ok(Property {
        schema,
        optional: !required.iter().any(|entry| entry == name),
        readonly,
    })
}

fn decode_additional_properties(
    value: &Value,
    path: &str,
) -> Result<AdditionalProperties, SchemaError> {
    match value {
        Value::Bool(allowed) => Ok(AdditionalProperties::Allowed(*allowed)),
        Value::Object(_) => Ok(AdditionalProperties::Schema(Box::new(decode(value, path)?))),
        other => Err(invalid(
            path,
            format!("expected boolean or schema, got {}", json_type_name(other)),
        )),
    }
}

fn decode_computed(
    map: &Map<String, Value>,
    record: &Value,
    path: &str,
) -> Result<Schema, SchemaError> {
    let Value::Object(record) = record else {
        return Err(invalid(
            &format!("{}/$computed", path),
            format!("expected object, got {}", json_type_name(record)),
        ));
    };
    let operator = record
        .get("operator")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(&format!("{}/$computed/operator", path), "expected string"))?;
    let operands = record
        .get("operands")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(&format!("{}/$computed/operands", path), "expected array"))?;
    let operands = operands
        .iter()
        .enumerate()
        .map(|(index, operand)| {
            decode(operand, &format!("{}/$computed/operands/{}", path, index))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Schema::Computed(ComputedSchema {
        operator: operator.to_string(),
        operands,
        metadata: metadata_except(map, &["$computed"]),
    }))
}

fn decode_mapped_key(keys: &Value, path: &str) -> Result<Schema, SchemaError> {
    let Value::Array(keys) = keys else {
        return Err(invalid(
            &format!("{}/$mappedKey", path),
            format!("expected array, got {}", json_type_name(keys)),
        ));
    };
    let keys = keys
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            if let Value::String(s) = entry {
                return Ok(Key::Str(s.clone()));
            }
            if let Some(n) = entry.as_i64() {
                return Ok(Key::Int(n));
            }
            Err(invalid(
                &format!("{}/$mappedKey/{}", path, index),
                format!("expected string or integer, got {}", json_type_name(entry)),
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Schema::MappedKey(MappedKeySchema { keys }))
}

fn decode_mapped_result(record: &Value, path: &str) -> Result<Schema, SchemaError> {
    let Value::Object(record) = record else {
        return Err(invalid(
            &format!("{}/$mappedResult", path),
            format!("expected object, got {}", json_type_name(record)),
        ));
    };
    let mut properties = IndexMap::new();
    for (name, entry) in record {
        let schema = decode(entry, &format!("{}/$mappedResult/{}", path, name))?;
        properties.insert(Key::Str(name.clone()), schema);
    }
    Ok(Schema::MappedResult(MappedResultSchema { properties }))
}

fn metadata_except(map: &Map<String, Value>, excluded: &[&str]) -> Metadata {
    map.iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

// --- serde integration ---

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        schema_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        schema_from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        intersect, literal, object, object_with, recursive, reference, string, union,
    };
    use crate::types::{optional, readonly};
    use serde_json::json;

    fn user_schema() -> Schema {
        let mut properties = Properties::new();
        properties.insert("a".into(), string().into());
        properties.insert("b".into(), optional(string()));
        object(properties)
    }

    // === Encoding Tests ===

    #[test]
    fn object_encodes_with_derived_required() {
        let value = schema_to_value(&user_schema());
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {
                    "a": { "type": "string" },
                    "b": { "type": "string" }
                },
                "required": ["a"]
            })
        );
    }

    #[test]
    fn empty_required_is_omitted() {
        let mut properties = Properties::new();
        properties.insert("a".into(), optional(string()));
        let value = schema_to_value(&object(properties));
        assert!(value.get("required").is_none());
    }

    #[test]
    fn readonly_modifier_encodes_on_the_property() {
        let mut properties = Properties::new();
        properties.insert("a".into(), readonly(string()));
        let value = schema_to_value(&object(properties));
        assert_eq!(value["properties"]["a"]["readOnly"], json!(true));
    }

    #[test]
    fn integer_keys_encode_as_strings() {
        let mut properties = Properties::new();
        properties.insert(Key::Int(0), string().into());
        let value = schema_to_value(&object(properties));
        assert!(value["properties"].get("0").is_some());
        assert_eq!(value["required"], json!(["0"]));
    }

    #[test]
    fn object_options_encode() {
        let options = ObjectOptions {
            additional_properties: Some(AdditionalProperties::Allowed(false)),
            min_properties: Some(1),
            max_properties: Some(3),
            extra: Metadata::new(),
        };
        let value = schema_to_value(&object_with(Properties::new(), options));
        assert_eq!(value["additionalProperties"], json!(false));
        assert_eq!(value["minProperties"], json!(1));
        assert_eq!(value["maxProperties"], json!(3));
    }

    #[test]
    fn composites_use_json_schema_keywords() {
        assert_eq!(
            schema_to_value(&union(vec![string(), literal("a")])),
            json!({ "anyOf": [{ "type": "string" }, { "const": "a" }] })
        );
        assert_eq!(
            schema_to_value(&intersect(vec![string()])),
            json!({ "allOf": [{ "type": "string" }] })
        );
        assert_eq!(
            schema_to_value(&reference("User")),
            json!({ "$ref": "User" })
        );
    }

    #[test]
    fn computed_encodes_under_carrier_keyword() {
        let deferred = crate::schema::computed("Pick", vec![reference("User"), literal("a")]);
        assert_eq!(
            schema_to_value(&deferred),
            json!({
                "$computed": {
                    "operator": "Pick",
                    "operands": [{ "$ref": "User" }, { "const": "a" }]
                }
            })
        );
    }

    // === Decoding Tests ===

    #[test]
    fn object_round_trips_with_modifiers() {
        let mut properties = Properties::new();
        properties.insert("a".into(), string().into());
        properties.insert("b".into(), optional(string()));
        properties.insert("c".into(), readonly(optional(string())));
        let schema = object(properties);

        let decoded = schema_from_value(&schema_to_value(&schema)).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn recursive_and_computed_round_trip() {
        let schema = recursive(user_schema());
        let decoded = schema_from_value(&schema_to_value(&schema)).unwrap();
        assert_eq!(decoded, schema);

        let deferred = crate::schema::computed("Omit", vec![reference("User"), literal(3)]);
        let decoded = schema_from_value(&schema_to_value(&deferred)).unwrap();
        assert_eq!(decoded, deferred);
    }

    #[test]
    fn absent_required_means_all_optional() {
        let decoded = schema_from_value(&json!({
            "type": "object",
            "properties": { "a": { "type": "string" } }
        }))
        .unwrap();
        let Schema::Object(object) = decoded else {
            panic!("expected object");
        };
        assert!(object.required_keys().is_empty());
    }

    #[test]
    fn unknown_leaf_decodes_verbatim() {
        let raw = json!({ "type": "string", "minLength": 1 });
        let decoded = schema_from_value(&raw).unwrap();
        let Schema::Other(map) = decoded else {
            panic!("expected passthrough");
        };
        assert_eq!(Value::Object(map), raw);
    }

    #[test]
    fn metadata_survives_composites() {
        let decoded = schema_from_value(&json!({
            "anyOf": [{ "type": "string" }],
            "description": "choice"
        }))
        .unwrap();
        let Schema::Union(u) = decoded else {
            panic!("expected union");
        };
        assert_eq!(u.metadata.get("description"), Some(&json!("choice")));
    }

    #[test]
    fn non_object_root_errors() {
        let err = schema_from_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { .. }));
        assert!(err.to_string().contains("expected object, got array"));
    }

    #[test]
    fn bad_ref_target_errors_with_path() {
        let err = schema_from_value(&json!({ "$ref": 7 })).unwrap_err();
        assert!(err.to_string().contains("#/$ref"));
    }

    #[test]
    fn bad_member_errors_with_indexed_path() {
        let err =
            schema_from_value(&json!({ "anyOf": [{ "type": "string" }, 5] })).unwrap_err();
        assert!(err.to_string().contains("#/anyOf/1"));
    }

    #[test]
    fn bad_additional_properties_errors() {
        let err = schema_from_value(&json!({
            "type": "object",
            "properties": {},
            "additionalProperties": 3
        }))
        .unwrap_err();
        assert!(err.to_string().contains("additionalProperties"));
    }
}
