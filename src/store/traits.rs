use crate::logic::{CityFilter, PageRequest};
use crate::model::{City, Id, Include, PointOfInterest};
use crate::store::{AppliedChanges, StagedChange};
use anyhow::Result;

#[async_trait::async_trait]
pub trait CityStore: Send + Sync {
    /// All cities ordered by name, ties by id
    async fn list_cities(&self) -> Result<Vec<City>>;
    /// One page of filtered cities plus the filtered total before paging
    async fn query_cities(&self, filter: &CityFilter, page: &PageRequest) -> Result<(Vec<City>, u64)>;
    async fn get_city(&self, id: Id, include: Include) -> Result<Option<City>>;
    async fn city_exists(&self, id: Id) -> Result<bool>;
    /// Insert or replace a city and its points of interest (seeding)
    async fn upsert_city(&self, city: City) -> Result<()>;
}

#[async_trait::async_trait]
pub trait PointOfInterestStore: Send + Sync {
    async fn list_points_of_interest_for_city(&self, city_id: Id) -> Result<Vec<PointOfInterest>>;
    /// Looks the point of interest up by both ids; an id belonging to another
    /// city yields `None`
    async fn get_point_of_interest_for_city(
        &self,
        city_id: Id,
        point_of_interest_id: Id,
    ) -> Result<Option<PointOfInterest>>;
}

#[async_trait::async_trait]
pub trait ChangeStore: Send + Sync {
    /// Apply every change atomically. On error nothing is applied.
    async fn commit(&self, changes: Vec<StagedChange>) -> Result<AppliedChanges>;
}

pub trait Store: CityStore + PointOfInterestStore + ChangeStore + Send + Sync {}
