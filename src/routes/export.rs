//! Export routes: playlist downloads, guide download and stream URL
//! resolution.
//!
//! Everything here bottoms out in the same canonical media URL shape; the
//! playlist routes wrap it in an extended-M3U document, the guide route
//! streams the panel's XMLTV body through unchanged.

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::AppError;
use crate::services::playlist::{build_playlist, map_to_entry, sanitize_filename, PlaylistEntry};
use crate::services::xtream::types::{index_categories, json_to_string};
use crate::services::xtream::{ContentKind, Credentials, OutputFormat};
use crate::services::xtream::urls;
use crate::AppState;

const M3U_CONTENT_TYPE: &str = "application/x-mpegURL";

#[derive(Deserialize)]
pub struct StreamUrlRequest {
    #[serde(flatten)]
    pub creds: Credentials,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Serialize)]
pub struct StreamUrlResponse {
    pub url: String,
    pub vlc: String,
}

#[derive(Deserialize)]
pub struct M3uRequest {
    #[serde(flatten)]
    pub creds: Credentials,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Deserialize)]
pub struct OneM3uRequest {
    #[serde(flatten)]
    pub creds: Credentials,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

fn attachment(
    content_type: &str,
    filename: &str,
    body: impl Into<Body>,
) -> Result<Response<Body>, AppError> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(body.into())?)
}

/// POST /api/stream/url
///
/// Resolve one stream to its direct media URL, plus the same URL under a
/// `vlc://` scheme for click-to-open.
pub async fn stream_url(
    State(_state): State<Arc<AppState>>,
    Json(req): Json<StreamUrlRequest>,
) -> Result<Json<StreamUrlResponse>, AppError> {
    let id = match req.id.as_ref().and_then(json_to_string) {
        Some(id) if req.creds.validate().is_ok() => id,
        _ => {
            return Err(AppError::validation(
                "Missing baseUrl, username, password or id",
            ))
        }
    };
    let kind = ContentKind::parse(req.kind.as_deref().unwrap_or("live"));
    let format = OutputFormat::parse(req.format.as_deref().unwrap_or("mpegts"));
    let url = urls::build_stream_url(
        &req.creds.base_url,
        kind,
        &req.creds.username,
        &req.creds.password,
        &id,
        format,
    )?;
    let vlc = format!("vlc://{url}");
    Ok(Json(StreamUrlResponse { url, vlc }))
}

/// POST /api/m3u
///
/// Full playlist export. Live and VOD categories and streams are fetched
/// concurrently; results join by category id, so upstream response order
/// does not matter. Entry order follows the panel's listing order.
pub async fn m3u(
    State(state): State<Arc<AppState>>,
    Json(req): Json<M3uRequest>,
) -> Result<Response<Body>, AppError> {
    req.creds.validate()?;
    let scope = req.scope.as_deref().unwrap_or("all");
    if !matches!(scope, "all" | "live" | "vod") {
        return Err(AppError::validation("scope must be all, live or vod"));
    }
    let output = OutputFormat::parse(req.output.as_deref().unwrap_or("mpegts"));
    let client = state.panel_client(&req.creds)?;

    let (live_cats, live_streams, vod_cats, vod_streams) = tokio::try_join!(
        client.get_live_categories(),
        client.get_live_streams(),
        client.get_vod_categories(),
        client.get_vod_streams(),
    )?;

    let live_by_id = index_categories(&live_cats);
    let vod_by_id = index_categories(&vod_cats);

    let mut entries: Vec<PlaylistEntry> = Vec::new();
    if scope == "all" || scope == "live" {
        for item in live_streams.as_array().into_iter().flatten() {
            entries.push(map_to_entry(
                ContentKind::Live,
                item,
                &live_by_id,
                &req.creds,
                output,
            )?);
        }
    }
    if scope == "all" || scope == "vod" {
        for item in vod_streams.as_array().into_iter().flatten() {
            entries.push(map_to_entry(
                ContentKind::Movie,
                item,
                &vod_by_id,
                &req.creds,
                output,
            )?);
        }
    }

    let document = build_playlist(&format!("Xtream {scope}"), &entries);
    attachment(M3U_CONTENT_TYPE, &format!("xtream_{scope}.m3u"), document)
}

/// POST /api/one.m3u
///
/// Single-entry playlist for one stream, named after the entry.
pub async fn one_m3u(
    State(_state): State<Arc<AppState>>,
    Json(req): Json<OneM3uRequest>,
) -> Result<Response<Body>, AppError> {
    let id = match req.id.as_ref().and_then(json_to_string) {
        Some(id) if req.creds.validate().is_ok() => id,
        _ => {
            return Err(AppError::validation(
                "Missing baseUrl, username, password or id",
            ))
        }
    };
    let kind = ContentKind::parse(req.kind.as_deref().unwrap_or("live"));
    let output = OutputFormat::parse(req.output.as_deref().unwrap_or("mpegts"));
    let name = req.name.as_deref().unwrap_or("Stream").to_string();

    let url = urls::build_stream_url(
        &req.creds.base_url,
        kind,
        &req.creds.username,
        &req.creds.password,
        &id,
        output,
    )?;
    let entry = PlaylistEntry {
        name: name.clone(),
        url,
        ..PlaylistEntry::default()
    };
    let document = build_playlist(&name, &[entry]);
    attachment(
        M3U_CONTENT_TYPE,
        &format!("{}.m3u", sanitize_filename(&name)),
        document,
    )
}

/// POST /api/xmltv
///
/// The guide can run to tens of megabytes; the panel's response body is
/// streamed straight through without buffering.
pub async fn xmltv(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Response<Body>, AppError> {
    creds.validate()?;
    let client = state.panel_client(&creds)?;
    let upstream = client.fetch_xmltv().await?;

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/xml")
        .to_string();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"guide.xml\"",
        )
        .body(Body::from_stream(upstream.bytes_stream()))?)
}
