use crate::model::{Id, PointOfInterest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub points_of_interest: Vec<PointOfInterest>,
}

impl City {
    pub fn new(id: Id, name: &str, description: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
            points_of_interest: Vec::new(),
        }
    }

    pub fn with_point_of_interest(mut self, id: Id, name: &str, description: Option<&str>) -> Self {
        self.points_of_interest.push(PointOfInterest {
            id,
            city_id: self.id,
            name: name.to_string(),
            description: description.map(str::to_string),
        });
        self
    }

    /// Copy of the city with its points of interest left out
    pub fn without_points_of_interest(&self) -> City {
        City {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            points_of_interest: Vec::new(),
        }
    }

    pub fn number_of_points_of_interest(&self) -> usize {
        self.points_of_interest.len()
    }
}

/// City representation returned when points of interest were requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDto {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub number_of_points_of_interest: usize,
    pub points_of_interest: Vec<crate::model::PointOfInterestDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWithoutPointsOfInterestDto {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
}

impl From<City> for CityDto {
    fn from(city: City) -> Self {
        let number_of_points_of_interest = city.number_of_points_of_interest();
        Self {
            id: city.id,
            name: city.name,
            description: city.description,
            number_of_points_of_interest,
            points_of_interest: city.points_of_interest.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<City> for CityWithoutPointsOfInterestDto {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            name: city.name,
            description: city.description,
        }
    }
}
