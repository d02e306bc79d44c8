use axum::{
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::config::PaginationConfig;
use crate::logic::PageRequest;
use crate::model::PaginationMetadata;

pub const PAGINATION_HEADER: &str = "x-pagination";

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn is_requested(&self) -> bool {
        self.page_number.is_some() || self.page_size.is_some()
    }

    /// Clamp the caller's paging input to the configured bounds
    pub fn to_page_request(&self, config: &PaginationConfig) -> PageRequest {
        PageRequest::clamped(
            self.page_number,
            self.page_size,
            config.default_page_size,
            config.max_page_size,
        )
    }
}

/// Pagination metadata travels out of band, as JSON in `X-Pagination`
pub fn pagination_headers(metadata: &PaginationMetadata) -> Result<HeaderMap, ApiError> {
    let value = serde_json::to_string(metadata).map_err(anyhow::Error::from)?;
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(PAGINATION_HEADER),
        HeaderValue::from_str(&value).map_err(anyhow::Error::from)?,
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_uses_defaults() {
        let config = PaginationConfig::default();
        let query = PageQuery::default();
        assert!(!query.is_requested());
        let page = query.to_page_request(&config);
        assert_eq!((page.page_number(), page.page_size()), (1, 10));

        let query = PageQuery {
            page_number: Some(2),
            page_size: Some(100),
        };
        let page = query.to_page_request(&config);
        assert_eq!((page.page_number(), page.page_size()), (2, 20));
    }

    #[test]
    fn test_pagination_header_contents() {
        let headers = pagination_headers(&PaginationMetadata::new(25, 10, 3)).unwrap();
        let raw = headers.get(PAGINATION_HEADER).unwrap().to_str().unwrap();
        let json: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(json["totalItemCount"], 25);
        assert_eq!(json["totalPageCount"], 3);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["currentPage"], 3);
    }
}
