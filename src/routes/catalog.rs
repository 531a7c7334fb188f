//! Panel catalog routes.
//!
//! Thin pass-throughs over the panel API: validate credentials, fetch, and
//! return the panel's JSON unchanged. Stream listings fetch their category
//! list concurrently with the items so the browser can render group names
//! from a single response.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::AppError;
use crate::services::xtream::types::{filter_by_category, json_to_string};
use crate::services::xtream::Credentials;
use crate::AppState;

/// Default number of EPG listings returned by `/api/epg`.
const DEFAULT_EPG_LIMIT: u32 = 50;

#[derive(Deserialize)]
pub struct StreamsRequest {
    #[serde(flatten)]
    pub creds: Credentials,
    /// Optional filter; panels send category ids as strings or numbers.
    #[serde(default)]
    pub category_id: Option<Value>,
}

#[derive(Deserialize)]
pub struct EpgRequest {
    #[serde(flatten)]
    pub creds: Credentials,
    #[serde(default)]
    pub stream_id: Option<Value>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// POST /api/account
pub async fn account(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<Value>, AppError> {
    creds.validate()?;
    let client = state.panel_client(&creds)?;
    let data = client.get_account_info().await?;
    Ok(Json(json!({
        "user_info": data.get("user_info").cloned().unwrap_or(Value::Null),
        "server_info": data.get("server_info").cloned().unwrap_or(Value::Null),
    })))
}

/// POST /api/live/categories
pub async fn live_categories(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<Value>, AppError> {
    creds.validate()?;
    let client = state.panel_client(&creds)?;
    Ok(Json(client.get_live_categories().await?))
}

/// POST /api/live/streams
pub async fn live_streams(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StreamsRequest>,
) -> Result<Json<Value>, AppError> {
    req.creds.validate()?;
    let client = state.panel_client(&req.creds)?;
    let (categories, streams) =
        tokio::try_join!(client.get_live_categories(), client.get_live_streams())?;
    let wanted = req.category_id.as_ref().and_then(json_to_string);
    let streams = filter_by_category(streams, wanted.as_deref());
    Ok(Json(json!({ "categories": categories, "streams": streams })))
}

/// POST /api/vod/categories
pub async fn vod_categories(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<Value>, AppError> {
    creds.validate()?;
    let client = state.panel_client(&creds)?;
    Ok(Json(client.get_vod_categories().await?))
}

/// POST /api/vod/streams
pub async fn vod_streams(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StreamsRequest>,
) -> Result<Json<Value>, AppError> {
    req.creds.validate()?;
    let client = state.panel_client(&req.creds)?;
    let (categories, streams) =
        tokio::try_join!(client.get_vod_categories(), client.get_vod_streams())?;
    let wanted = req.category_id.as_ref().and_then(json_to_string);
    let streams = filter_by_category(streams, wanted.as_deref());
    Ok(Json(json!({ "categories": categories, "streams": streams })))
}

/// POST /api/series/categories
pub async fn series_categories(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<Value>, AppError> {
    creds.validate()?;
    let client = state.panel_client(&creds)?;
    Ok(Json(client.get_series_categories().await?))
}

/// POST /api/series/list
pub async fn series_list(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StreamsRequest>,
) -> Result<Json<Value>, AppError> {
    req.creds.validate()?;
    let client = state.panel_client(&req.creds)?;
    let (categories, series) =
        tokio::try_join!(client.get_series_categories(), client.get_series_list())?;
    let wanted = req.category_id.as_ref().and_then(json_to_string);
    let series = filter_by_category(series, wanted.as_deref());
    Ok(Json(json!({ "categories": categories, "series": series })))
}

/// POST /api/epg
pub async fn short_epg(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EpgRequest>,
) -> Result<Json<Value>, AppError> {
    req.creds.validate()?;
    let stream_id = req
        .stream_id
        .as_ref()
        .and_then(json_to_string)
        .ok_or_else(|| AppError::validation("Missing stream_id"))?;
    let client = state.panel_client(&req.creds)?;
    Ok(Json(
        client
            .get_short_epg(&stream_id, req.limit.unwrap_or(DEFAULT_EPG_LIMIT))
            .await?,
    ))
}
