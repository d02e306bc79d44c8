use serde::{Deserialize, Serialize};

pub type Id = i32;

pub const NAME_MAX_LENGTH: usize = 50;
pub const DESCRIPTION_MAX_LENGTH: usize = 200;

/// Whether a city is resolved together with its points of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Include {
    WithPointsOfInterest,
    WithoutPointsOfInterest,
}

impl Include {
    pub fn from_flag(include_points_of_interest: Option<bool>) -> Self {
        match include_points_of_interest {
            Some(true) => Include::WithPointsOfInterest,
            Some(false) | None => Include::WithoutPointsOfInterest,
        }
    }

    pub fn points_of_interest(&self) -> bool {
        matches!(self, Include::WithPointsOfInterest)
    }
}

impl Default for Include {
    fn default() -> Self {
        Include::WithoutPointsOfInterest
    }
}
