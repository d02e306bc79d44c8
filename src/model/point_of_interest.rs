use crate::model::Id;
use serde::{Deserialize, Serialize};

/// Point of interest as persisted, always scoped to its city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub id: Id,
    pub city_id: Id,
    pub name: String,
    pub description: Option<String>,
}

impl PointOfInterest {
    /// The fields a client may change through PUT or PATCH
    pub fn updatable_fields(&self) -> PointOfInterestForUpdate {
        PointOfInterestForUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    pub fn apply(&mut self, fields: PointOfInterestForUpdate) {
        self.name = fields.name;
        self.description = fields.description;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterestDto {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
}

impl From<PointOfInterest> for PointOfInterestDto {
    fn from(point: PointOfInterest) -> Self {
        Self {
            id: point.id,
            name: point.name,
            description: point.description,
        }
    }
}

/// Updatable fields of a point of interest. Also the staging copy a patch
/// document is applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterestForUpdate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}
