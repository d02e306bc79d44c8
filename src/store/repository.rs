use anyhow::Result;
use std::sync::Arc;

use crate::logic::{paginate, CityFilter, PageRequest};
use crate::model::{City, Id, Include, PaginationMetadata, PointOfInterest, PointOfInterestForUpdate};
use crate::store::traits::Store;
use crate::store::{AppliedChanges, StagedChange};

/// Per-request view of the store.
///
/// Reads go straight to the store. Writes are only queued and become
/// visible once [`CityInfoRepository::save_changes`] commits them together.
/// Dropping the repository without saving discards the queue.
pub struct CityInfoRepository<S: Store> {
    store: Arc<S>,
    staged: Vec<StagedChange>,
}

impl<S: Store> CityInfoRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    pub async fn get_cities(&self) -> Result<Vec<City>> {
        self.store.list_cities().await
    }

    /// Filtered, ordered page of cities. The total in the metadata counts
    /// every match, not just the returned page.
    pub async fn get_cities_page(
        &self,
        filter: &CityFilter,
        page: &PageRequest,
    ) -> Result<(Vec<City>, PaginationMetadata)> {
        let (cities, total_item_count) = self.store.query_cities(filter, page).await?;
        Ok((cities, page.metadata(total_item_count)))
    }

    pub async fn get_city(&self, id: Id, include: Include) -> Result<Option<City>> {
        self.store.get_city(id, include).await
    }

    pub async fn city_exists(&self, id: Id) -> Result<bool> {
        self.store.city_exists(id).await
    }

    pub async fn get_points_of_interest_for_city(&self, city_id: Id) -> Result<Vec<PointOfInterest>> {
        self.store.list_points_of_interest_for_city(city_id).await
    }

    pub async fn get_points_of_interest_page(
        &self,
        city_id: Id,
        page: &PageRequest,
    ) -> Result<(Vec<PointOfInterest>, PaginationMetadata)> {
        let points = self.store.list_points_of_interest_for_city(city_id).await?;
        Ok(paginate(points, page))
    }

    pub async fn get_point_of_interest_for_city(
        &self,
        city_id: Id,
        point_of_interest_id: Id,
    ) -> Result<Option<PointOfInterest>> {
        self.store
            .get_point_of_interest_for_city(city_id, point_of_interest_id)
            .await
    }

    pub fn add_point_of_interest_for_city(&mut self, city_id: Id, fields: PointOfInterestForUpdate) {
        self.staged
            .push(StagedChange::InsertPointOfInterest { city_id, fields });
    }

    pub fn update_point_of_interest(&mut self, point: &PointOfInterest, fields: PointOfInterestForUpdate) {
        self.staged.push(StagedChange::UpdatePointOfInterest {
            city_id: point.city_id,
            id: point.id,
            fields,
        });
    }

    pub fn delete_point_of_interest(&mut self, point: &PointOfInterest) {
        self.staged.push(StagedChange::DeletePointOfInterest {
            city_id: point.city_id,
            id: point.id,
        });
    }

    /// Commit every queued change in one atomic step. Succeeds with zero
    /// rows when nothing was queued. The queue is emptied either way.
    pub async fn save_changes(&mut self) -> Result<AppliedChanges> {
        let changes = std::mem::take(&mut self.staged);
        self.store.commit(changes).await
    }
}
