use serde_json::{Map, Value};

/// System fields owned by the store. They are set on insert/update and can
/// never be supplied by API input, which also makes `user_id` immutable
/// through the update path.
pub const SYSTEM_FIELDS: &[&str] = &["id", "user_id", "created_at", "updated_at"];

/// A resource type served by the generic CRUD surface: a table plus the
/// declared shape of its documents.
pub trait Resource {
    /// Table name, e.g. "books"
    const TABLE: &'static str;
    /// Singular display name used in client-facing messages, e.g. "book"
    const NAME: &'static str;

    fn fields() -> &'static [FieldSpec];
}

/// Declared type of a document field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    /// Embedded sub-document with its own field specs
    Object(&'static [FieldSpec]),
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Bool => "boolean",
            FieldKind::Object(_) => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::Object(_) => value.is_object(),
        }
    }
}

/// Declared shape of one document field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            min: None,
            max: None,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            min: None,
            max: None,
        }
    }

    /// Numeric range constraint, inclusive on both ends
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Whether a payload is a full document or a partial field set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// All required fields must be present
    Create,
    /// Absent fields are left untouched; provided fields are still checked
    Update,
}

/// Errors from document validation at the Store boundary
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("System field '{0}' cannot be set via API input")]
    SystemFieldNotAllowed(String),
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Invalid type for field '{field}': expected {expected}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
    },
    #[error("Value for field '{field}' must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },
}

/// Validate an API payload against a resource's field specs and return the
/// cleaned document: declared fields only, unknown keys dropped.
///
/// Sub-documents are always validated in full; the update path replaces the
/// whole embedded object, so a partial sub-document would silently lose
/// fields otherwise.
pub fn validate_document<R: Resource>(
    payload: &Value,
    mode: ValidationMode,
) -> Result<Map<String, Value>, SchemaError> {
    let input = payload
        .as_object()
        .ok_or_else(|| SchemaError::InvalidJson("Expected JSON object".to_string()))?;

    for key in input.keys() {
        if SYSTEM_FIELDS.contains(&key.as_str()) {
            return Err(SchemaError::SystemFieldNotAllowed(key.clone()));
        }
    }

    validate_fields(input, R::fields(), mode, None)
}

fn validate_fields(
    input: &Map<String, Value>,
    specs: &[FieldSpec],
    mode: ValidationMode,
    parent: Option<&str>,
) -> Result<Map<String, Value>, SchemaError> {
    let mut cleaned = Map::new();

    for spec in specs {
        let path = match parent {
            Some(parent) => format!("{}.{}", parent, spec.name),
            None => spec.name.to_string(),
        };

        let value = match input.get(spec.name) {
            Some(Value::Null) | None => {
                if spec.required && mode == ValidationMode::Create {
                    return Err(SchemaError::MissingRequiredField(path));
                }
                continue;
            }
            Some(value) => value,
        };

        if !spec.kind.matches(value) {
            return Err(SchemaError::InvalidFieldType {
                field: path,
                expected: spec.kind.expected(),
            });
        }

        let value = match spec.kind {
            FieldKind::Object(sub_specs) => {
                // Whole-object replace semantics: sub-documents validate as Create
                let sub_input = value.as_object().unwrap();
                Value::Object(validate_fields(
                    sub_input,
                    sub_specs,
                    ValidationMode::Create,
                    Some(&path),
                )?)
            }
            FieldKind::Number => {
                let n = value.as_f64().unwrap_or_default();
                if let (Some(min), Some(max)) = (spec.min, spec.max) {
                    if n < min || n > max {
                        return Err(SchemaError::OutOfRange {
                            field: path,
                            min,
                            max,
                        });
                    }
                }
                value.clone()
            }
            _ => value.clone(),
        };

        cleaned.insert(spec.name.to_string(), value);
    }

    Ok(cleaned)
}
