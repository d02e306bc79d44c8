use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Json,
};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::handlers::{pagination_headers, PageQuery};
use crate::api::state::AppState;
use crate::logic::{FieldValidator, PatchEngine, ValidationErrors};
use crate::model::{Id, PointOfInterest, PointOfInterestDto};
use crate::notify::point_of_interest_deleted;
use crate::store::traits::Store;
use crate::store::CityInfoRepository;

pub fn point_of_interest_location(city_id: Id, point_of_interest_id: Id) -> String {
    format!("/api/cities/{}/pointsofinterest/{}", city_id, point_of_interest_id)
}

/// Checked before any point of interest lookup so a missing city is
/// reported as such
async fn ensure_city_exists<S: Store>(
    repository: &CityInfoRepository<S>,
    city_id: Id,
) -> Result<(), ApiError> {
    if repository.city_exists(city_id).await? {
        Ok(())
    } else {
        log::info!(
            "City with id {} was not found when accessing points of interest",
            city_id
        );
        Err(ApiError::CityNotFound(city_id))
    }
}

async fn find_point_of_interest<S: Store>(
    repository: &CityInfoRepository<S>,
    city_id: Id,
    point_of_interest_id: Id,
) -> Result<PointOfInterest, ApiError> {
    ensure_city_exists(repository, city_id).await?;

    repository
        .get_point_of_interest_for_city(city_id, point_of_interest_id)
        .await?
        .ok_or_else(|| {
            log::info!(
                "Point of interest with id {} was not found in city {}",
                point_of_interest_id,
                city_id
            );
            ApiError::PointOfInterestNotFound {
                city_id,
                point_of_interest_id,
            }
        })
}

/// Request bodies are read as raw JSON so that missing resources are
/// reported before anything about the body itself
fn request_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            log::debug!("Rejected request body: {}", rejection.body_text());
            let mut errors = ValidationErrors::new();
            errors.add("body", rejection.body_text());
            Err(ApiError::Validation(errors))
        }
    }
}

pub async fn get_points_of_interest<S: Store>(
    State(state): State<AppState<S>>,
    Path(city_id): Path<Id>,
    Query(query): Query<PageQuery>,
) -> Result<(HeaderMap, Json<Vec<PointOfInterestDto>>), ApiError> {
    let repository = state.repository();
    ensure_city_exists(&repository, city_id).await?;

    let (points, headers) = if query.is_requested() {
        let page = query.to_page_request(&state.pagination);
        let (points, metadata) = repository.get_points_of_interest_page(city_id, &page).await?;
        (points, pagination_headers(&metadata)?)
    } else {
        let points = repository.get_points_of_interest_for_city(city_id).await?;
        (points, HeaderMap::new())
    };

    Ok((headers, Json(points.into_iter().map(Into::into).collect())))
}

pub async fn get_point_of_interest<S: Store>(
    State(state): State<AppState<S>>,
    Path((city_id, point_of_interest_id)): Path<(Id, Id)>,
) -> Result<Json<PointOfInterestDto>, ApiError> {
    let repository = state.repository();
    let point = find_point_of_interest(&repository, city_id, point_of_interest_id).await?;
    Ok(Json(point.into()))
}

pub async fn create_point_of_interest<S: Store>(
    State(state): State<AppState<S>>,
    Path(city_id): Path<Id>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<PointOfInterestDto>), ApiError> {
    let mut repository = state.repository();
    ensure_city_exists(&repository, city_id).await?;

    let fields = FieldValidator::parse_point_of_interest(&request_body(body)?)?;

    repository.add_point_of_interest_for_city(city_id, fields);
    let applied = repository.save_changes().await?;
    let created = applied
        .inserted
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Store did not report the inserted point of interest"))?;

    log::info!(
        "Created point of interest {} ({}) in city {}",
        created.id,
        created.name,
        city_id
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        HeaderValue::from_str(&point_of_interest_location(city_id, created.id))
            .map_err(anyhow::Error::from)?,
    );

    Ok((StatusCode::CREATED, headers, Json(created.into())))
}

pub async fn update_point_of_interest<S: Store>(
    State(state): State<AppState<S>>,
    Path((city_id, point_of_interest_id)): Path<(Id, Id)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let mut repository = state.repository();
    let point = find_point_of_interest(&repository, city_id, point_of_interest_id).await?;

    let update = FieldValidator::parse_point_of_interest(&request_body(body)?)?;

    repository.update_point_of_interest(&point, update);
    repository.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn partially_update_point_of_interest<S: Store>(
    State(state): State<AppState<S>>,
    Path((city_id, point_of_interest_id)): Path<(Id, Id)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let mut repository = state.repository();
    let point = find_point_of_interest(&repository, city_id, point_of_interest_id).await?;

    let patched = PatchEngine::apply_document(&point.updatable_fields(), request_body(body)?)?;

    repository.update_point_of_interest(&point, patched);
    repository.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_point_of_interest<S: Store>(
    State(state): State<AppState<S>>,
    Path((city_id, point_of_interest_id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError> {
    let mut repository = state.repository();
    let point = find_point_of_interest(&repository, city_id, point_of_interest_id).await?;

    repository.delete_point_of_interest(&point);
    repository.save_changes().await?;

    // The deletion is committed; a failed notification does not undo it
    let (subject, message) = point_of_interest_deleted(&point.name, point.id);
    if let Err(e) = state.mailer.send(&subject, &message).await {
        log::warn!(
            "Failed to send deletion notice for point of interest {}: {:#}",
            point.id,
            e
        );
    }

    Ok(StatusCode::NO_CONTENT)
}
