use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::logic::validate::{FieldValidator, ValidationErrors};
use crate::model::{PatchOperation, PatchOperationDto, PatchPath, PointOfInterestForUpdate};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("Invalid JSON Patch document: {0}")]
    InvalidDocument(String),
    #[error("Unsupported patch operation '{0}'")]
    UnknownOperation(String),
    #[error("The target location '{0}' does not exist on the resource")]
    InvalidPath(String),
    #[error("The '{op}' operation on '{path}' requires a value")]
    MissingValue { op: String, path: String },
    #[error("The '{op}' operation requires a 'from' location")]
    MissingFrom { op: String },
    #[error("Invalid value for '{path}': {reason}")]
    InvalidValue { path: PatchPath, reason: String },
    #[error("The current value of '{path}' does not match the tested value")]
    TestFailed { path: PatchPath },
    #[error("Failed to apply operation on '{path}': {reason}")]
    Rejected { path: PatchPath, reason: String },
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
}

impl PatchError {
    /// True when every operation applied and only field validation failed
    pub fn is_validation(&self) -> bool {
        matches!(self, PatchError::Validation(_))
    }
}

pub fn parse_path(raw: &str) -> Result<PatchPath, PatchError> {
    let segment = raw
        .strip_prefix('/')
        .ok_or_else(|| PatchError::InvalidPath(raw.to_string()))?;
    if segment.eq_ignore_ascii_case("name") {
        Ok(PatchPath::Name)
    } else if segment.eq_ignore_ascii_case("description") {
        Ok(PatchPath::Description)
    } else {
        Err(PatchError::InvalidPath(raw.to_string()))
    }
}

/// Both updatable fields hold a string or nothing
fn check_field_value(path: PatchPath, value: &Value) -> Result<(), PatchError> {
    match value {
        Value::String(_) | Value::Null => Ok(()),
        other => Err(PatchError::InvalidValue {
            path,
            reason: format!("expected a string, got {}", json_type_name(other)),
        }),
    }
}

impl TryFrom<PatchOperationDto> for PatchOperation {
    type Error = PatchError;

    fn try_from(dto: PatchOperationDto) -> Result<Self, Self::Error> {
        let path = parse_path(&dto.path)?;
        let op = dto.op.to_ascii_lowercase();

        let value = |value: Option<Value>| {
            value.ok_or_else(|| PatchError::MissingValue {
                op: op.clone(),
                path: dto.path.clone(),
            })
        };
        let from = |from: Option<String>| {
            from.ok_or_else(|| PatchError::MissingFrom { op: op.clone() })
                .and_then(|raw| parse_path(&raw))
        };

        match op.as_str() {
            "add" => {
                let value = value(dto.value)?;
                check_field_value(path, &value)?;
                Ok(PatchOperation::Add { path, value })
            }
            "replace" => {
                let value = value(dto.value)?;
                check_field_value(path, &value)?;
                Ok(PatchOperation::Replace { path, value })
            }
            "remove" => Ok(PatchOperation::Remove { path }),
            "copy" => Ok(PatchOperation::Copy {
                from: from(dto.from)?,
                path,
            }),
            "move" => Ok(PatchOperation::Move {
                from: from(dto.from)?,
                path,
            }),
            "test" => Ok(PatchOperation::Test {
                path,
                value: value(dto.value)?,
            }),
            _ => Err(PatchError::UnknownOperation(dto.op)),
        }
    }
}

impl PatchOperation {
    /// Target field of the operation
    pub fn path(&self) -> PatchPath {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Test { path, .. } => *path,
        }
    }

    /// RFC 6902 form with the canonical pointer for the field
    fn to_json(&self) -> Value {
        match self {
            PatchOperation::Add { path, value } => {
                json!({"op": "add", "path": path.to_string(), "value": value})
            }
            PatchOperation::Replace { path, value } => {
                json!({"op": "replace", "path": path.to_string(), "value": value})
            }
            PatchOperation::Remove { path } => json!({"op": "remove", "path": path.to_string()}),
            PatchOperation::Copy { from, path } => {
                json!({"op": "copy", "from": from.to_string(), "path": path.to_string()})
            }
            PatchOperation::Move { from, path } => {
                json!({"op": "move", "from": from.to_string(), "path": path.to_string()})
            }
            PatchOperation::Test { path, value } => {
                json!({"op": "test", "path": path.to_string(), "value": value})
            }
        }
    }
}

/// Check a whole wire document before any operation is applied
pub fn parse_document(document: Value) -> Result<Vec<PatchOperation>, PatchError> {
    let operations: Vec<PatchOperationDto> = serde_json::from_value(document)
        .map_err(|e| PatchError::InvalidDocument(e.to_string()))?;
    operations.into_iter().map(PatchOperation::try_from).collect()
}

/// JSON shape of the staging copy. Fields are optional because a patch may
/// remove or null them; validation reports that afterwards.
#[derive(Debug, Serialize, Deserialize)]
struct StagedFields {
    name: Option<String>,
    description: Option<String>,
}

impl From<&PointOfInterestForUpdate> for StagedFields {
    fn from(fields: &PointOfInterestForUpdate) -> Self {
        Self {
            name: Some(fields.name.clone()),
            description: fields.description.clone(),
        }
    }
}

impl From<StagedFields> for PointOfInterestForUpdate {
    fn from(staged: StagedFields) -> Self {
        Self {
            name: staged.name.unwrap_or_default(),
            description: staged.description,
        }
    }
}

pub struct PatchEngine;

impl PatchEngine {
    /// Apply `operations` in order to a staging copy of `current` and
    /// validate the result. `current` is never modified; on any failure the
    /// staging copy is dropped.
    pub fn apply(
        current: &PointOfInterestForUpdate,
        operations: &[PatchOperation],
    ) -> Result<PointOfInterestForUpdate, PatchError> {
        let patch: json_patch::Patch = serde_json::from_value(Value::Array(
            operations.iter().map(PatchOperation::to_json).collect(),
        ))
        .map_err(|e| PatchError::InvalidDocument(e.to_string()))?;

        let mut staging = serde_json::to_value(StagedFields::from(current))
            .map_err(|e| PatchError::InvalidDocument(e.to_string()))?;

        json_patch::patch(&mut staging, &patch).map_err(|e| {
            match operations.get(e.operation) {
                Some(PatchOperation::Test { path, .. }) => PatchError::TestFailed { path: *path },
                Some(operation) => PatchError::Rejected {
                    path: operation.path(),
                    reason: e.to_string(),
                },
                None => PatchError::InvalidDocument(e.to_string()),
            }
        })?;

        let staged: StagedFields = serde_json::from_value(staging)
            .map_err(|e| PatchError::InvalidDocument(e.to_string()))?;
        let patched = PointOfInterestForUpdate::from(staged);

        FieldValidator::validate_point_of_interest(&patched).map_err(PatchError::Validation)?;
        Ok(patched)
    }

    /// Parse and apply a wire document in one step
    pub fn apply_document(
        current: &PointOfInterestForUpdate,
        document: Value,
    ) -> Result<PointOfInterestForUpdate, PatchError> {
        let operations = parse_document(document)?;
        Self::apply(current, &operations)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower() -> PointOfInterestForUpdate {
        PointOfInterestForUpdate {
            name: "Eiffel Tower".to_string(),
            description: Some("A wrought iron lattice tower on the Champ de Mars.".to_string()),
        }
    }

    #[test]
    fn test_replace_updates_staging_copy_only() {
        let current = tower();
        let patched = PatchEngine::apply_document(
            &current,
            json!([{"op": "replace", "path": "/name", "value": "La Tour Eiffel"}]),
        )
        .unwrap();

        assert_eq!(patched.name, "La Tour Eiffel");
        assert_eq!(patched.description, current.description);
        assert_eq!(current, tower());
    }

    #[test]
    fn test_operations_apply_in_order() {
        let patched = PatchEngine::apply_document(
            &tower(),
            json!([
                {"op": "replace", "path": "/description", "value": "first"},
                {"op": "replace", "path": "/description", "value": "second"},
                {"op": "test", "path": "/description", "value": "second"}
            ]),
        )
        .unwrap();
        assert_eq!(patched.description.as_deref(), Some("second"));
    }

    #[test]
    fn test_paths_are_case_insensitive() {
        assert_eq!(parse_path("/Name").unwrap(), PatchPath::Name);
        assert_eq!(parse_path("/DESCRIPTION").unwrap(), PatchPath::Description);
        assert!(parse_path("name").is_err());
        assert!(parse_path("/id").is_err());
        assert!(parse_path("/name/0").is_err());

        let patched = PatchEngine::apply_document(
            &tower(),
            json!([{"op": "replace", "path": "/Name", "value": "Tour"}]),
        )
        .unwrap();
        assert_eq!(patched.name, "Tour");
    }

    #[test]
    fn test_unknown_path_rejects_whole_document() {
        let err = PatchEngine::apply_document(
            &tower(),
            json!([
                {"op": "replace", "path": "/name", "value": "Renamed"},
                {"op": "replace", "path": "/cityId", "value": 7}
            ]),
        )
        .unwrap_err();
        assert_eq!(err, PatchError::InvalidPath("/cityId".to_string()));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_document_must_be_an_operation_array() {
        assert!(matches!(
            PatchEngine::apply_document(&tower(), json!({"name": "Tour"})),
            Err(PatchError::InvalidDocument(_))
        ));
        assert!(matches!(
            PatchEngine::apply_document(&tower(), json!([{"op": 1, "path": "/name"}])),
            Err(PatchError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_remove_name_fails_validation() {
        let current = tower();
        let err = PatchEngine::apply_document(&current, json!([{"op": "remove", "path": "/name"}]))
            .unwrap_err();
        match err {
            PatchError::Validation(errors) => assert!(errors.field("name").is_some()),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(current, tower());
    }

    #[test]
    fn test_null_name_fails_validation() {
        let err = PatchEngine::apply_document(
            &tower(),
            json!([{"op": "replace", "path": "/name", "value": null}]),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_remove_description_clears_it() {
        let patched = PatchEngine::apply_document(
            &tower(),
            json!([{"op": "remove", "path": "/description"}]),
        )
        .unwrap();
        assert_eq!(patched.description, None);
    }

    #[test]
    fn test_remove_missing_field_is_rejected() {
        let err = PatchEngine::apply_document(
            &tower(),
            json!([
                {"op": "remove", "path": "/description"},
                {"op": "remove", "path": "/description"}
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::Rejected { path: PatchPath::Description, .. }));
    }

    #[test]
    fn test_copy_and_move() {
        let copied = PatchEngine::apply_document(
            &tower(),
            json!([{"op": "copy", "from": "/name", "path": "/description"}]),
        )
        .unwrap();
        assert_eq!(copied.description.as_deref(), Some("Eiffel Tower"));

        let moved = PatchEngine::apply_document(
            &tower(),
            json!([{"op": "move", "from": "/description", "path": "/name"}]),
        )
        .unwrap();
        assert_eq!(moved.name, "A wrought iron lattice tower on the Champ de Mars.");
        assert_eq!(moved.description, None);
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            PatchEngine::apply_document(&tower(), json!([{"op": "replace", "path": "/name"}])),
            Err(PatchError::MissingValue { .. })
        ));
        assert!(matches!(
            PatchEngine::apply_document(&tower(), json!([{"op": "copy", "path": "/name"}])),
            Err(PatchError::MissingFrom { .. })
        ));
        assert!(matches!(
            PatchEngine::apply_document(
                &tower(),
                json!([{"op": "merge", "path": "/name", "value": "x"}])
            ),
            Err(PatchError::UnknownOperation(_))
        ));
        assert!(matches!(
            PatchEngine::apply_document(
                &tower(),
                json!([{"op": "replace", "path": "/name", "value": 42}])
            ),
            Err(PatchError::InvalidValue { path: PatchPath::Name, .. })
        ));
        assert!(matches!(
            PatchEngine::apply_document(
                &tower(),
                json!([{"op": "test", "path": "/name", "value": "Louvre"}])
            ),
            Err(PatchError::TestFailed { path: PatchPath::Name })
        ));
    }

    #[test]
    fn test_overlong_name_fails_validation() {
        let err = PatchEngine::apply_document(
            &tower(),
            json!([{"op": "replace", "path": "/name", "value": "x".repeat(51)}]),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }
}
