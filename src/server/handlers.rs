//! Request handlers
//!
//! Request errors never escape as a crash: user mistakes come back as 400,
//! anything else as 500, both with the message in `explanation`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::page;
use crate::app::MatchupOutcome;
use crate::{AppContext, HoopsError};

type Ctx = State<Arc<AppContext>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DatesQuery {
    #[serde(default)]
    pub home: String,
    #[serde(default)]
    pub away: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatesResponse {
    pub dates: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub home: String,
    pub away: String,
    pub date: String,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub label: String,
    pub explanation: String,
    pub probability: Option<f64>,
}

impl From<&MatchupOutcome> for PredictResponse {
    fn from(outcome: &MatchupOutcome) -> Self {
        PredictResponse {
            label: outcome.label(),
            explanation: outcome.explanation_markdown(),
            probability: outcome.probability(),
        }
    }
}

pub async fn index(State(ctx): Ctx) -> Html<String> {
    Html(page::render(ctx.config.predict.threshold))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_teams(State(ctx): Ctx) -> Json<TeamsResponse> {
    Json(TeamsResponse { teams: ctx.teams() })
}

pub async fn get_dates(State(ctx): Ctx, Query(query): Query<DatesQuery>) -> Json<DatesResponse> {
    let dates = if query.home.is_empty() || query.away.is_empty() {
        Vec::new()
    } else {
        ctx.available_dates(&query.home, &query.away)
    };
    Json(DatesResponse { dates })
}

pub async fn predict(
    State(ctx): Ctx,
    Json(req): Json<PredictRequest>,
) -> (StatusCode, Json<PredictResponse>) {
    match ctx.predict_matchup(&req.home, &req.away, &req.date, req.threshold) {
        Ok(outcome) => (StatusCode::OK, Json(PredictResponse::from(&outcome))),
        Err(e) => error_response(e),
    }
}

fn error_response(e: HoopsError) -> (StatusCode, Json<PredictResponse>) {
    let (status, label) = if e.is_user_error() {
        log::debug!("Rejected request: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid input")
    } else {
        log::error!("Prediction failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Error")
    };
    (
        status,
        Json(PredictResponse {
            label: label.to_string(),
            explanation: e.to_string(),
            probability: None,
        }),
    )
}
