//! HTTP API handlers for Stepwise.
//!
//! These handlers are thin wrappers around [`Tracker`]: they extract the
//! request, call exactly one tracker operation and render the result. Every
//! read endpoint is recomputed from the stored samples on each call.
//!
//! - **POST /samples**: ingest one sample envelope from the mobile collector
//! - **GET /samples**: list stored samples, optionally filtered
//! - **DELETE /samples**: clear the sample store
//! - **GET /goals**, **PUT /goals**: read or update the daily goals
//! - **GET /summary**, **/insights**, **/predictions**, **/daily**: derived views
//! - **GET /health**: liveness check

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::error::AppResult;
use crate::model::{
    DayRecord, GoalConfig, GoalUpdate, IngestRequest, IngestResponse, IngestStatus, Insights,
    Predictions, Sample, SampleQuery, Summary,
};
use crate::tracker::Tracker;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
}

/// Build the full router with tracing and CORS layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/samples",
            get(get_samples).post(post_sample).delete(delete_samples),
        )
        .route("/goals", get(get_goals).put(put_goals))
        .route("/summary", get(get_summary))
        .route("/insights", get(get_insights))
        .route("/predictions", get(get_predictions))
        .route("/daily", get(get_daily))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// POST /samples - Ingest one sample envelope.
///
/// # Request Body
///
/// ```json
/// {
///     "device": { "deviceId": "pixel-7", "model": "Pixel 7", "osVersion": "14" },
///     "sample": { "steps": 1200, "distance": 870.5, "calories": 52,
///                 "start": "2024-03-01T08:00:00Z", "end": "2024-03-01T08:15:00Z" }
/// }
/// ```
///
/// Malformed numbers become `0` and missing timestamps become the current time.
///
/// # Response
///
/// `201 Created` for a new sample, `200 OK` when an existing window was replaced:
///
/// ```json
/// { "status": "created", "id": "6f1c..." }
/// ```
///
/// `400 Bad Request` when the body has no sample object.
#[instrument(skip(state, request))]
pub async fn post_sample(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> AppResult<(StatusCode, Json<IngestResponse>)> {
    match state.tracker.ingest(&request).await {
        Ok(response) => {
            info!(id = %response.id, status = ?response.status, "Sample stored");
            let code = match response.status {
                IngestStatus::Created => StatusCode::CREATED,
                IngestStatus::Updated => StatusCode::OK,
            };
            Ok((code, Json(response)))
        }
        Err(e) => {
            warn!(error = %e, "Failed to ingest sample");
            Err(e)
        }
    }
}

/// GET /samples - List stored samples in insertion order.
///
/// # Query Parameters
///
/// - `since` (optional): RFC 3339, offset-less ISO date-time (UTC), `YYYY-MM-DD` or epoch
///   milliseconds; drops samples ending earlier
/// - `limit` (optional): keep only the most recently inserted `limit` samples
#[instrument(skip(state))]
pub async fn get_samples(
    State(state): State<AppState>,
    Query(query): Query<SampleQuery>,
) -> Json<Vec<Sample>> {
    let samples = state.tracker.query(&query).await;
    info!(count = samples.len(), "Samples queried");
    Json(samples)
}

/// DELETE /samples - Clear every stored sample.
#[instrument(skip(state))]
pub async fn delete_samples(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.tracker.reset().await?;
    info!("Sample store reset");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /goals - Current goal configuration.
#[instrument(skip(state))]
pub async fn get_goals(State(state): State<AppState>) -> Json<GoalConfig> {
    Json(state.tracker.goals().await)
}

/// PUT /goals - Update the goals and return the recomputed summary.
///
/// # Request Body
///
/// ```json
/// { "steps": 8000, "calories": 400 }
/// ```
///
/// Either field may be omitted. A non-positive or non-numeric value is
/// rejected with `400 Bad Request` and the previous goals stay in effect.
#[instrument(skip(state))]
pub async fn put_goals(
    State(state): State<AppState>,
    Json(update): Json<GoalUpdate>,
) -> AppResult<Json<Summary>> {
    match state.tracker.set_goals(&update).await {
        Ok(summary) => {
            info!(
                step_goal = summary.goals.steps,
                calorie_goal = summary.goals.calories,
                "Goals updated"
            );
            Ok(Json(summary))
        }
        Err(e) => {
            warn!(error = %e, "Goal update rejected");
            Err(e)
        }
    }
}

/// GET /summary - Goals, today's progress, streak, insights and predictions.
///
/// # Response
///
/// ```json
/// {
///     "goals": { "steps": 8000, "calories": 400.0 },
///     "today": { "steps": 6000, "calories": 200.0, "stepGoal": 8000, "calorieGoal": 400.0,
///                "stepProgress": 0.75, "calorieProgress": 0.5 },
///     "streak": { "days": 3 },
///     "insights": { "averageSteps7d": 7200, "averageCalories7d": 310,
///                   "goalComplianceRate": 0.6, "bestDay": { "date": "2024-03-08", "steps": 12000, "calories": 540.0 } },
///     "predictions": { "steps": 7400, "calories": 320, "basisDays": 10 }
/// }
/// ```
#[instrument(skip(state))]
pub async fn get_summary(State(state): State<AppState>) -> Json<Summary> {
    let summary = state.tracker.summary().await;
    info!(
        today_steps = summary.today.steps,
        streak = summary.streak.days,
        "Summary computed"
    );
    Json(summary)
}

/// GET /insights - The insights section of the summary.
#[instrument(skip(state))]
pub async fn get_insights(State(state): State<AppState>) -> Json<Insights> {
    Json(state.tracker.insights().await)
}

/// GET /predictions - The predictions section of the summary.
#[instrument(skip(state))]
pub async fn get_predictions(State(state): State<AppState>) -> Json<Predictions> {
    Json(state.tracker.predictions().await)
}

/// GET /daily - Every daily aggregate, oldest first.
#[instrument(skip(state))]
pub async fn get_daily(State(state): State<AppState>) -> Json<Vec<DayRecord>> {
    Json(state.tracker.daily_history().await)
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
