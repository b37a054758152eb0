// src/server/routes.rs

//! HTTP handlers for the UI: health, the scrape-activities endpoint and the
//! admin dashboard. Scrape and dashboard bodies carry a `success` flag.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::AppState;
use crate::error::{AppError, Result};
use crate::services::{AdminDashboard, ScrapeReport};

const MAX_CITY_CHARS: usize = 100;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/scrape-activities",
            get(scrape_from_query).post(scrape_from_body),
        )
        .route("/api/admin/dashboard", get(admin_dashboard))
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeRequest {
    #[serde(default)]
    city: Option<String>,
}

/// `{ "success": true, ...payload }`
#[derive(Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

impl<T> Success<T> {
    fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn scrape_from_body(
    State(state): State<AppState>,
    body: std::result::Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<Success<ScrapeReport>>> {
    let Json(request) =
        body.map_err(|e| AppError::validation(format!("invalid request body: {}", e.body_text())))?;
    scrape(&state, request).await
}

async fn scrape_from_query(
    State(state): State<AppState>,
    Query(request): Query<ScrapeRequest>,
) -> Result<Json<Success<ScrapeReport>>> {
    scrape(&state, request).await
}

async fn scrape(state: &AppState, request: ScrapeRequest) -> Result<Json<Success<ScrapeReport>>> {
    let city = checked_city(request.city)?;
    log::info!("Scrape requested for {}", city);
    let report = state.scraper.scrape_city(&city).await;
    Ok(Success::new(report))
}

fn checked_city(city: Option<String>) -> Result<String> {
    let city = city.as_deref().map(str::trim).unwrap_or_default();
    if city.is_empty() {
        return Err(AppError::validation("city is required"));
    }
    if city.chars().count() > MAX_CITY_CHARS {
        return Err(AppError::validation(format!(
            "city must be at most {MAX_CITY_CHARS} characters"
        )));
    }
    Ok(city.to_string())
}

async fn admin_dashboard(State(state): State<AppState>) -> Result<Json<Success<AdminDashboard>>> {
    let dashboard = state.admin.dashboard(Utc::now().date_naive()).await?;
    Ok(Success::new(dashboard))
}
