//! Structural contracts for function inputs and outputs.
//!
//! A [`Schema`] is a flat list of [`Field`]s checked against JSON objects.
//! Unknown fields are rejected, required fields must be present and non-null,
//! optional fields may be absent or `null`.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::core::NodeValue;

/// The semantic type of a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array(Box<FieldKind>),
    Any,
}

impl FieldKind {
    pub fn array_of(item: FieldKind) -> Self {
        FieldKind::Array(Box::new(item))
    }

    fn accepts(&self, value: &NodeValue) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Object => value.is_object(),
            FieldKind::Array(item) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| item.accepts(v))),
            FieldKind::Any => true,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => f.write_str("string"),
            FieldKind::Integer => f.write_str("integer"),
            FieldKind::Number => f.write_str("number"),
            FieldKind::Boolean => f.write_str("boolean"),
            FieldKind::Object => f.write_str("object"),
            FieldKind::Array(item) => write!(f, "[{}]", item),
            FieldKind::Any => f.write_str("any"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            return Ok(FieldKind::array_of(inner.parse()?));
        }
        match s {
            "string" => Ok(FieldKind::String),
            "integer" => Ok(FieldKind::Integer),
            "number" => Ok(FieldKind::Number),
            "boolean" => Ok(FieldKind::Boolean),
            "object" => Ok(FieldKind::Object),
            "any" | "" => Ok(FieldKind::Any),
            other => Err(format!("unknown field type '{}'", other)),
        }
    }
}

/// A single field of a schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: String,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        kind: FieldKind,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
            description: description.into(),
        }
    }
}

/// The structural contract of one side (input or output) of a function.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field.
    pub fn required(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(Field::new(name, kind, true, description));
        self
    }

    /// Add an optional field.
    pub fn optional(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(Field::new(name, kind, false, description));
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks `value` against this schema, reporting every violation found.
    pub fn validate(&self, value: &NodeValue) -> Result<(), String> {
        let Some(object) = value.as_object() else {
            return Err(format!("expected an object, got {}", kind_of(value)));
        };

        let mut problems = Vec::new();

        for key in object.keys() {
            if self.field(key).is_none() {
                problems.push(format!("unknown field '{}'", key));
            }
        }

        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(NodeValue::Null) if field.required => {
                    problems.push(format!("missing required field '{}'", field.name));
                }
                None | Some(NodeValue::Null) => {}
                Some(v) if !field.kind.accepts(v) => problems.push(format!(
                    "field '{}' expected {}, got {}",
                    field.name,
                    field.kind,
                    kind_of(v)
                )),
                Some(_) => {}
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Returns a stable, structural hash of the schema.
    /// Descriptions are excluded so rewording a field does not change identity.
    pub fn structural_hash(&self) -> String {
        let mut hasher = DefaultHasher::new();
        for field in &self.fields {
            field.name.hash(&mut hasher);
            field.kind.hash(&mut hasher);
            field.required.hash(&mut hasher);
        }
        format!("{:016x}", hasher.finish())
    }
}

fn kind_of(value: &NodeValue) -> &'static str {
    match value {
        NodeValue::Null => "null",
        NodeValue::Bool(_) => "boolean",
        NodeValue::Number(n) if n.is_f64() => "number",
        NodeValue::Number(_) => "integer",
        NodeValue::String(_) => "string",
        NodeValue::Array(_) => "array",
        NodeValue::Object(_) => "object",
    }
}

impl FromStr for Schema {
    type Err = String;

    /// Parses shorthand syntax: `"event_idea: string, limit?: integer, names?: [string]"`.
    /// A trailing `?` on the name marks the field optional; a missing type means `any`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut schema = Schema::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, kind) = match part.split_once(':') {
                Some((name, kind)) => (name.trim(), kind.parse()?),
                None => (part, FieldKind::Any),
            };
            let (name, required) = match name.strip_suffix('?') {
                Some(name) => (name.trim(), false),
                None => (name, true),
            };
            if name.is_empty() {
                return Err(format!("field without a name in '{}'", part));
            }
            schema.fields.push(Field::new(name, kind, required, ""));
        }
        Ok(schema)
    }
}

/// Macro for rapid schema creation: `schema!("event_idea: string")`
#[macro_export]
macro_rules! schema {
    ($s:expr) => {
        $s.parse::<$crate::core::schema::Schema>()
            .expect("Invalid schema shorthand")
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shorthand_parsing() {
        let schema: Schema = "event_idea: string, limit?: integer, names?: [string], extra"
            .parse()
            .unwrap();
        assert_eq!(schema.fields.len(), 4);
        assert_eq!(schema.fields[0].kind, FieldKind::String);
        assert!(schema.fields[0].required);
        assert!(!schema.fields[1].required);
        assert_eq!(schema.fields[2].kind, FieldKind::array_of(FieldKind::String));
        assert_eq!(schema.fields[3].kind, FieldKind::Any);
    }

    #[test]
    fn test_schema_macro() {
        let schema = crate::schema!("selected_theme: string, moderators?: [object]");
        assert_eq!(schema.fields[1].kind, FieldKind::array_of(FieldKind::Object));
        assert!(schema.field("moderators").is_some_and(|f| !f.required));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!("a: timestamp".parse::<Schema>().is_err());
    }

    #[test]
    fn test_validate_accepts_conforming_object() {
        let schema: Schema = "event_idea: string, limit?: integer".parse().unwrap();
        assert!(schema.validate(&json!({"event_idea": "pickle ball"})).is_ok());
        assert!(schema
            .validate(&json!({"event_idea": "pickle ball", "limit": null}))
            .is_ok());
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let schema: Schema = "event_idea: string, limit?: integer".parse().unwrap();
        let err = schema
            .validate(&json!({"limit": "two", "colour": "red"}))
            .unwrap_err();
        assert!(err.contains("unknown field 'colour'"));
        assert!(err.contains("missing required field 'event_idea'"));
        assert!(err.contains("field 'limit' expected integer, got string"));
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let schema: Schema = "a: string".parse().unwrap();
        assert_eq!(
            schema.validate(&json!(["a"])).unwrap_err(),
            "expected an object, got array"
        );
    }

    #[test]
    fn test_array_items_are_checked() {
        let schema: Schema = "names: [string]".parse().unwrap();
        assert!(schema.validate(&json!({"names": ["a", "b"]})).is_ok());
        assert!(schema.validate(&json!({"names": ["a", 1]})).is_err());
    }

    #[test]
    fn test_integer_rejects_fractional_numbers() {
        let schema: Schema = "limit: integer".parse().unwrap();
        assert!(schema.validate(&json!({"limit": 2.5})).is_err());
        assert!(schema.validate(&json!({"limit": 2})).is_ok());
    }

    #[test]
    fn test_structural_hash_ignores_descriptions() {
        let a = Schema::new().required("x", FieldKind::String, "first wording");
        let b = Schema::new().required("x", FieldKind::String, "second wording");
        let c = Schema::new().optional("x", FieldKind::String, "first wording");
        assert_eq!(a.structural_hash(), b.structural_hash());
        assert_ne!(a.structural_hash(), c.structural_hash());
    }
}
