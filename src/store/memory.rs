use anyhow::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::logic::{order_cities, paginate, CityFilter, PageRequest};
use crate::model::{City, Id, Include, PointOfInterest};
use crate::store::traits::{ChangeStore, CityStore, PointOfInterestStore, Store};
use crate::store::{AppliedChanges, CommitConflict, StagedChange};

#[derive(Debug, Clone)]
struct State {
    cities: BTreeMap<Id, City>,
    next_point_of_interest_id: Id,
}

impl State {
    fn city_mut(&mut self, city_id: Id) -> Result<&mut City> {
        self.cities
            .get_mut(&city_id)
            .ok_or(CommitConflict::CityMissing { city_id })
            .map_err(Into::into)
    }

    fn apply(&mut self, change: StagedChange, applied: &mut AppliedChanges) -> Result<()> {
        match change {
            StagedChange::InsertPointOfInterest { city_id, fields } => {
                let id = self.next_point_of_interest_id;
                let city = self.city_mut(city_id)?;
                let point = PointOfInterest {
                    id,
                    city_id,
                    name: fields.name,
                    description: fields.description,
                };
                city.points_of_interest.push(point.clone());
                self.next_point_of_interest_id += 1;
                applied.inserted.push(point);
            }
            StagedChange::UpdatePointOfInterest { city_id, id, fields } => {
                let point = self
                    .city_mut(city_id)?
                    .points_of_interest
                    .iter_mut()
                    .find(|point| point.id == id)
                    .ok_or(CommitConflict::PointOfInterestMissing { city_id, id })?;
                point.apply(fields);
            }
            StagedChange::DeletePointOfInterest { city_id, id } => {
                let city = self.city_mut(city_id)?;
                let before = city.points_of_interest.len();
                city.points_of_interest.retain(|point| point.id != id);
                if city.points_of_interest.len() == before {
                    return Err(CommitConflict::PointOfInterestMissing { city_id, id }.into());
                }
            }
        }
        applied.rows_affected += 1;
        Ok(())
    }
}

/// Store kept entirely in process memory.
///
/// Commits are applied to a copy of the current state and only swapped in
/// once every staged change succeeded.
#[derive(Debug)]
pub struct InMemoryStore {
    state: RwLock<State>,
    commits: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                cities: BTreeMap::new(),
                next_point_of_interest_id: 1,
            }),
            commits: AtomicUsize::new(0),
        }
    }

    /// Store pre-populated with the demonstration cities
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write();
            for city in crate::seed::seed_cities() {
                insert_city(&mut state, city);
            }
        }
        store
    }

    /// Number of successful commits so far
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_city(state: &mut State, city: City) {
    if let Some(max_id) = city.points_of_interest.iter().map(|point| point.id).max() {
        state.next_point_of_interest_id = state.next_point_of_interest_id.max(max_id + 1);
    }
    state.cities.insert(city.id, city);
}

#[async_trait::async_trait]
impl CityStore for InMemoryStore {
    async fn list_cities(&self) -> Result<Vec<City>> {
        let state = self.state.read();
        Ok(order_cities(state.cities.values())
            .into_iter()
            .map(|city| city.without_points_of_interest())
            .collect())
    }

    async fn query_cities(&self, filter: &CityFilter, page: &PageRequest) -> Result<(Vec<City>, u64)> {
        let state = self.state.read();
        let matching = order_cities(state.cities.values().filter(|city| filter.matches(city)));
        let (items, metadata) = paginate(matching, page);
        let items = items
            .iter()
            .map(City::without_points_of_interest)
            .collect();
        Ok((items, metadata.total_item_count()))
    }

    async fn get_city(&self, id: Id, include: Include) -> Result<Option<City>> {
        let state = self.state.read();
        Ok(state.cities.get(&id).map(|city| match include {
            Include::WithPointsOfInterest => city.clone(),
            Include::WithoutPointsOfInterest => city.without_points_of_interest(),
        }))
    }

    async fn city_exists(&self, id: Id) -> Result<bool> {
        Ok(self.state.read().cities.contains_key(&id))
    }

    async fn upsert_city(&self, city: City) -> Result<()> {
        insert_city(&mut self.state.write(), city);
        Ok(())
    }
}

#[async_trait::async_trait]
impl PointOfInterestStore for InMemoryStore {
    async fn list_points_of_interest_for_city(&self, city_id: Id) -> Result<Vec<PointOfInterest>> {
        let state = self.state.read();
        Ok(state
            .cities
            .get(&city_id)
            .map(|city| city.points_of_interest.clone())
            .unwrap_or_default())
    }

    async fn get_point_of_interest_for_city(
        &self,
        city_id: Id,
        point_of_interest_id: Id,
    ) -> Result<Option<PointOfInterest>> {
        let state = self.state.read();
        Ok(state.cities.get(&city_id).and_then(|city| {
            city.points_of_interest
                .iter()
                .find(|point| point.id == point_of_interest_id && point.city_id == city_id)
                .cloned()
        }))
    }
}

#[async_trait::async_trait]
impl ChangeStore for InMemoryStore {
    async fn commit(&self, changes: Vec<StagedChange>) -> Result<AppliedChanges> {
        let mut state = self.state.write();
        let mut staged = state.clone();
        let mut applied = AppliedChanges::default();

        for change in changes {
            staged.apply(change, &mut applied)?;
        }

        *state = staged;
        self.commits.fetch_add(1, Ordering::SeqCst);
        log::debug!("Committed {} change(s) to in-memory store", applied.rows_affected);
        Ok(applied)
    }
}

impl Store for InMemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PointOfInterestForUpdate;

    fn fields(name: &str) -> PointOfInterestForUpdate {
        PointOfInterestForUpdate {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_seeded_store_contents() {
        let store = InMemoryStore::seeded();
        let cities = store.list_cities().await.unwrap();
        let names: Vec<_> = cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Melbourne", "New York City", "Paris"]);
        assert!(cities.iter().all(|c| c.points_of_interest.is_empty()));

        let paris = store.get_city(3, Include::WithPointsOfInterest).await.unwrap().unwrap();
        assert_eq!(paris.number_of_points_of_interest(), 2);
        assert!(paris.points_of_interest.iter().all(|p| p.city_id == 3));

        let paris = store.get_city(3, Include::WithoutPointsOfInterest).await.unwrap().unwrap();
        assert!(paris.points_of_interest.is_empty());
    }

    #[tokio::test]
    async fn test_point_of_interest_lookup_is_scoped() {
        let store = InMemoryStore::seeded();
        assert!(store.get_point_of_interest_for_city(3, 4).await.unwrap().is_some());
        // Central Park (id 1) belongs to New York City
        assert!(store.get_point_of_interest_for_city(3, 1).await.unwrap().is_none());
        assert!(store.get_point_of_interest_for_city(99, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_assigns_fresh_ids() {
        let store = InMemoryStore::seeded();
        let applied = store
            .commit(vec![
                StagedChange::InsertPointOfInterest { city_id: 3, fields: fields("Arc de Triomphe") },
                StagedChange::InsertPointOfInterest { city_id: 2, fields: fields("Federation Square") },
            ])
            .await
            .unwrap();

        assert_eq!(applied.rows_affected, 2);
        let ids: Vec<_> = applied.inserted.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![6, 7]);
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_state_unchanged() {
        let store = InMemoryStore::seeded();
        let before = store.get_city(3, Include::WithPointsOfInterest).await.unwrap();

        let result = store
            .commit(vec![
                StagedChange::DeletePointOfInterest { city_id: 3, id: 4 },
                StagedChange::UpdatePointOfInterest { city_id: 3, id: 42, fields: fields("Nowhere") },
            ])
            .await;

        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<CommitConflict>(),
            Some(&CommitConflict::PointOfInterestMissing { city_id: 3, id: 42 })
        );
        assert_eq!(store.get_city(3, Include::WithPointsOfInterest).await.unwrap(), before);
        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_insert_into_missing_city_is_a_conflict() {
        let store = InMemoryStore::seeded();
        let err = store
            .commit(vec![StagedChange::InsertPointOfInterest { city_id: 99, fields: fields("Nowhere") }])
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CommitConflict>(),
            Some(&CommitConflict::CityMissing { city_id: 99 })
        );
    }

    #[tokio::test]
    async fn test_empty_commit_succeeds() {
        let store = InMemoryStore::new();
        let applied = store.commit(Vec::new()).await.unwrap();
        assert_eq!(applied.rows_affected, 0);
    }

    #[tokio::test]
    async fn test_query_cities_pages_after_filtering() {
        let store = InMemoryStore::new();
        for id in 1..=25 {
            store
                .upsert_city(City::new(id, &format!("City {:02}", id), Some("Somewhere")))
                .await
                .unwrap();
        }
        store.upsert_city(City::new(26, "Elsewhere", None)).await.unwrap();

        let filter = CityFilter::new(None, Some("Somewhere"));
        let page = PageRequest::clamped(Some(3), Some(10), 10, 20);
        let (items, total) = store.query_cities(&filter, &page).await.unwrap();

        assert_eq!(total, 25);
        let names: Vec<_> = items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["City 21", "City 22", "City 23", "City 24", "City 25"]);
    }
}
