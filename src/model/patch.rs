use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One operation of a JSON Patch document as it arrives on the wire.
///
/// Paths are kept as raw strings here and only become [`PatchPath`] once the
/// whole document has been checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperationDto {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// The only fields of a point of interest a patch may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchPath {
    Name,
    Description,
}

impl PatchPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchPath::Name => "name",
            PatchPath::Description => "description",
        }
    }
}

impl std::fmt::Display for PatchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

/// A validated patch operation
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    Add { path: PatchPath, value: Value },
    Replace { path: PatchPath, value: Value },
    Remove { path: PatchPath },
    Copy { from: PatchPath, path: PatchPath },
    Move { from: PatchPath, path: PatchPath },
    Test { path: PatchPath, value: Value },
}
