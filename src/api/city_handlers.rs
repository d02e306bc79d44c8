use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::handlers::{pagination_headers, PageQuery};
use crate::api::state::AppState;
use crate::logic::CityFilter;
use crate::model::{CityDto, CityWithoutPointsOfInterestDto, Id, Include};
use crate::store::traits::Store;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitiesQuery {
    pub name: Option<String>,
    pub search_query: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityQuery {
    pub include_points_of_interest: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CityResponse {
    WithPointsOfInterest(CityDto),
    WithoutPointsOfInterest(CityWithoutPointsOfInterestDto),
}

pub async fn get_cities<S: Store>(
    State(state): State<AppState<S>>,
    Query(query): Query<CitiesQuery>,
) -> Result<(HeaderMap, Json<Vec<CityWithoutPointsOfInterestDto>>), ApiError> {
    let filter = CityFilter::new(query.name.as_deref(), query.search_query.as_deref());
    let page = PageQuery {
        page_number: query.page_number,
        page_size: query.page_size,
    }
    .to_page_request(&state.pagination);

    let (cities, metadata) = state.repository().get_cities_page(&filter, &page).await?;
    log::debug!(
        "Returning {} of {} cities (page {})",
        cities.len(),
        metadata.total_item_count(),
        metadata.current_page()
    );

    Ok((
        pagination_headers(&metadata)?,
        Json(cities.into_iter().map(Into::into).collect()),
    ))
}

pub async fn get_city<S: Store>(
    State(state): State<AppState<S>>,
    Path(id): Path<Id>,
    Query(query): Query<CityQuery>,
) -> Result<Json<CityResponse>, ApiError> {
    let include = Include::from_flag(query.include_points_of_interest);
    let city = state
        .repository()
        .get_city(id, include)
        .await?
        .ok_or(ApiError::CityNotFound(id))?;

    Ok(Json(match include {
        Include::WithPointsOfInterest => CityResponse::WithPointsOfInterest(city.into()),
        Include::WithoutPointsOfInterest => CityResponse::WithoutPointsOfInterest(city.into()),
    }))
}
