// ABOUTME: Handlers for listing normalized jobs and passing job-detail pages through.
// ABOUTME: Validates query parameters before any upstream call and maps failures to GatewayError.

use std::collections::BTreeMap;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use euraxess_feed::JobRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MAX_LIMIT;
use crate::error::GatewayError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub count: usize,
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Deserialize)]
pub struct GetJobParams {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetJobResponse {
    pub url: String,
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub raw_html: String,
}

/// Resolves the requested listing size, falling back to `default`.
pub fn resolve_limit(limit: Option<i64>, default: u16) -> Result<usize, GatewayError> {
    match limit {
        None => Ok(usize::from(default)),
        Some(n) if (1..=i64::from(MAX_LIMIT)).contains(&n) => Ok(n as usize),
        Some(n) => Err(GatewayError::validation(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, n
        ))),
    }
}

fn query_error(rejection: QueryRejection) -> GatewayError {
    GatewayError::validation(rejection.body_text())
}

/// `GET /list_jobs?limit=N`
pub async fn list_jobs(
    State(state): State<AppState>,
    params: Result<Query<ListJobsParams>, QueryRejection>,
) -> Result<Json<ListJobsResponse>, GatewayError> {
    let Query(params) = params.map_err(query_error)?;
    let limit = resolve_limit(params.limit, state.default_limit)?;

    let text = state
        .client
        .fetch_feed(&state.feed_url)
        .await
        .map_err(GatewayError::feed)?;
    let records = state.parser.parse(&text)?;

    let jobs: Vec<JobRecord> = records.iter().take(limit).cloned().collect();
    debug!("Listing {} of {} jobs", jobs.len(), records.len());

    Ok(Json(ListJobsResponse {
        count: jobs.len(),
        jobs,
    }))
}

/// `GET /get_job?url=...`
pub async fn get_job(
    State(state): State<AppState>,
    params: Result<Query<GetJobParams>, QueryRejection>,
) -> Result<Json<GetJobResponse>, GatewayError> {
    let Query(params) = params.map_err(query_error)?;
    let url = match params.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return Err(GatewayError::validation("url query parameter is required")),
    };

    let page = state
        .client
        .fetch_page(&url)
        .await
        .map_err(GatewayError::page)?;

    Ok(Json(GetJobResponse {
        url: page.url,
        status_code: page.status_code,
        headers: page.headers,
        raw_html: page.body,
    }))
}
