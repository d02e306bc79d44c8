use thiserror::Error;

use crate::model::{Id, PointOfInterest, PointOfInterestForUpdate};

/// A mutation queued by the repository and flushed on commit
#[derive(Debug, Clone, PartialEq)]
pub enum StagedChange {
    InsertPointOfInterest {
        city_id: Id,
        fields: PointOfInterestForUpdate,
    },
    UpdatePointOfInterest {
        city_id: Id,
        id: Id,
        fields: PointOfInterestForUpdate,
    },
    DeletePointOfInterest {
        city_id: Id,
        id: Id,
    },
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedChanges {
    /// Rows written. Zero is a valid outcome.
    pub rows_affected: usize,
    /// Inserted points of interest with their store-assigned ids, in the
    /// order the inserts were staged
    pub inserted: Vec<PointOfInterest>,
}

/// A staged change whose target disappeared between staging and commit.
/// Stores raise it inside their `anyhow::Error` so callers can tell a lost
/// race from a backend failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitConflict {
    #[error("City {city_id} does not exist")]
    CityMissing { city_id: Id },
    #[error("Point of interest {id} does not exist in city {city_id}")]
    PointOfInterestMissing { city_id: Id, id: Id },
}
