use crate::logic::FieldValidator;
use crate::model::City;
use crate::store::traits::Store;
use anyhow::{anyhow, Result};

/// Demonstration cities with their points of interest
pub fn seed_cities() -> Vec<City> {
    vec![
        City::new(1, "New York City", Some("The one with the big park."))
            .with_point_of_interest(
                1,
                "Central Park",
                Some("The most visited urban park in the United States."),
            )
            .with_point_of_interest(
                2,
                "Empire State Building",
                Some("The 102-storey skyscraper located in Midtown Manhattan."),
            ),
        City::new(2, "Melbourne", Some("The one with the river bank."))
            .with_point_of_interest(3, "South Bank", Some("A river bank.")),
        City::new(3, "Paris", Some("The one with the big tower."))
            .with_point_of_interest(
                4,
                "Eiffel Tower",
                Some("A wrought iron lattice tower on the Champ de Mars."),
            )
            .with_point_of_interest(5, "The Louvre", Some("The world's largest museum.")),
    ]
}

/// Write the demonstration cities into `store`, replacing any rows with the
/// same ids
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    for city in seed_cities() {
        FieldValidator::validate_city(&city.name, city.description.as_deref())
            .map_err(|errors| anyhow!("Invalid seed city '{}': {}", city.name, errors))?;
        log::debug!("Seeding city {} ({})", city.id, city.name);
        store.upsert_city(city).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Include;
    use crate::store::traits::CityStore;
    use crate::store::InMemoryStore;

    #[test]
    fn test_seed_points_of_interest_reference_their_city() {
        for city in seed_cities() {
            for point in &city.points_of_interest {
                assert_eq!(point.city_id, city.id);
                assert!(FieldValidator::validate_point_of_interest(&point.updatable_fields()).is_ok());
            }
        }
    }

    #[tokio::test]
    async fn test_load_seed_data_is_repeatable() {
        let store = InMemoryStore::new();
        load_seed_data(&store).await.unwrap();
        load_seed_data(&store).await.unwrap();

        assert_eq!(store.list_cities().await.unwrap().len(), 3);
        let paris = store.get_city(3, Include::WithPointsOfInterest).await.unwrap().unwrap();
        assert_eq!(paris.points_of_interest[0].name, "Eiffel Tower");
    }
}
