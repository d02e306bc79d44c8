use anyhow::{bail, Context, Result};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::logic::{CityFilter, PageRequest};
use crate::model::{City, Id, Include, PointOfInterest};
use crate::store::traits::{ChangeStore, CityStore, PointOfInterestStore, Store};
use crate::store::{AppliedChanges, CommitConflict, StagedChange};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        id SERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL,
        description VARCHAR(200)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS points_of_interest (
        id SERIAL PRIMARY KEY,
        city_id INTEGER NOT NULL REFERENCES cities(id) ON DELETE CASCADE,
        name VARCHAR(50) NOT NULL,
        description VARCHAR(200)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS points_of_interest_city_id_idx ON points_of_interest (city_id)",
];

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the tables if they do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to run database migrations")?;
        }
        Ok(())
    }
}

fn city_from_row(row: &PgRow) -> City {
    City {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        points_of_interest: Vec::new(),
    }
}

fn point_of_interest_from_row(row: &PgRow) -> PointOfInterest {
    PointOfInterest {
        id: row.get("id"),
        city_id: row.get("city_id"),
        name: row.get("name"),
        description: row.get("description"),
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &CityFilter) {
    if let Some(name) = filter.name() {
        query.push(" AND name = ").push_bind(name.to_string());
    }
    if let Some(term) = filter.search_query() {
        // strpos keeps the match case-sensitive and free of LIKE wildcards
        query
            .push(" AND (strpos(name, ")
            .push_bind(term.to_string())
            .push(") > 0 OR strpos(COALESCE(description, ''), ")
            .push_bind(term.to_string())
            .push(") > 0)");
    }
}

#[async_trait::async_trait]
impl CityStore for PostgresStore {
    async fn list_cities(&self) -> Result<Vec<City>> {
        let rows = sqlx::query("SELECT id, name, description FROM cities ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list cities")?;

        Ok(rows.iter().map(city_from_row).collect())
    }

    async fn query_cities(&self, filter: &CityFilter, page: &PageRequest) -> Result<(Vec<City>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cities WHERE TRUE");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count cities")?;

        let mut select =
            QueryBuilder::<Postgres>::new("SELECT id, name, description FROM cities WHERE TRUE");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(i64::try_from(page.take()).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.skip()).unwrap_or(i64::MAX));

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query cities")?;

        Ok((
            rows.iter().map(city_from_row).collect(),
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn get_city(&self, id: Id, include: Include) -> Result<Option<City>> {
        let row = sqlx::query("SELECT id, name, description FROM cities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch city")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut city = city_from_row(&row);
        if include.points_of_interest() {
            city.points_of_interest = self.list_points_of_interest_for_city(id).await?;
        }
        Ok(Some(city))
    }

    async fn city_exists(&self, id: Id) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cities WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check city existence")?;

        Ok(exists)
    }

    async fn upsert_city(&self, city: City) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO cities (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description
            "#,
        )
        .bind(city.id)
        .bind(&city.name)
        .bind(&city.description)
        .execute(&mut *tx)
        .await
        .context("Failed to upsert city")?;

        for point in &city.points_of_interest {
            sqlx::query(
                r#"
                INSERT INTO points_of_interest (id, city_id, name, description)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    city_id = EXCLUDED.city_id,
                    name = EXCLUDED.name,
                    description = EXCLUDED.description
                "#,
            )
            .bind(point.id)
            .bind(city.id)
            .bind(&point.name)
            .bind(&point.description)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert point of interest")?;
        }

        // Explicit ids bypass the sequences, so move them past the seeded rows
        for table in ["cities", "points_of_interest"] {
            sqlx::query(&format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'), COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
            ))
            .execute(&mut *tx)
            .await
            .context("Failed to reset id sequence")?;
        }

        tx.commit().await.context("Failed to commit city upsert")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PointOfInterestStore for PostgresStore {
    async fn list_points_of_interest_for_city(&self, city_id: Id) -> Result<Vec<PointOfInterest>> {
        let rows = sqlx::query(
            "SELECT id, city_id, name, description FROM points_of_interest WHERE city_id = $1 ORDER BY id",
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list points of interest")?;

        Ok(rows.iter().map(point_of_interest_from_row).collect())
    }

    async fn get_point_of_interest_for_city(
        &self,
        city_id: Id,
        point_of_interest_id: Id,
    ) -> Result<Option<PointOfInterest>> {
        let row = sqlx::query(
            "SELECT id, city_id, name, description FROM points_of_interest WHERE city_id = $1 AND id = $2",
        )
        .bind(city_id)
        .bind(point_of_interest_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch point of interest")?;

        Ok(row.as_ref().map(point_of_interest_from_row))
    }
}

#[async_trait::async_trait]
impl ChangeStore for PostgresStore {
    async fn commit(&self, changes: Vec<StagedChange>) -> Result<AppliedChanges> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut applied = AppliedChanges::default();

        for change in changes {
            match change {
                StagedChange::InsertPointOfInterest { city_id, fields } => {
                    let row = sqlx::query(
                        r#"
                        INSERT INTO points_of_interest (city_id, name, description)
                        VALUES ($1, $2, $3)
                        RETURNING id, city_id, name, description
                        "#,
                    )
                    .bind(city_id)
                    .bind(&fields.name)
                    .bind(&fields.description)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        let city_missing = matches!(
                            &e,
                            sqlx::Error::Database(db) if db.is_foreign_key_violation()
                        );
                        if city_missing {
                            anyhow::Error::from(CommitConflict::CityMissing { city_id })
                        } else {
                            anyhow::Error::from(e).context("Failed to insert point of interest")
                        }
                    })?;

                    applied.inserted.push(point_of_interest_from_row(&row));
                    applied.rows_affected += 1;
                }
                StagedChange::UpdatePointOfInterest { city_id, id, fields } => {
                    let result = sqlx::query(
                        "UPDATE points_of_interest SET name = $1, description = $2 WHERE id = $3 AND city_id = $4",
                    )
                    .bind(&fields.name)
                    .bind(&fields.description)
                    .bind(id)
                    .bind(city_id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to update point of interest")?;

                    if result.rows_affected() == 0 {
                        bail!(CommitConflict::PointOfInterestMissing { city_id, id });
                    }
                    applied.rows_affected += 1;
                }
                StagedChange::DeletePointOfInterest { city_id, id } => {
                    let result =
                        sqlx::query("DELETE FROM points_of_interest WHERE id = $1 AND city_id = $2")
                            .bind(id)
                            .bind(city_id)
                            .execute(&mut *tx)
                            .await
                            .context("Failed to delete point of interest")?;

                    if result.rows_affected() == 0 {
                        bail!(CommitConflict::PointOfInterestMissing { city_id, id });
                    }
                    applied.rows_affected += 1;
                }
            }
        }

        tx.commit().await.context("Failed to commit changes")?;
        Ok(applied)
    }
}

impl Store for PostgresStore {}
