use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::{
    dto::{BacktestRequest, RunResponse},
    error::ApiError,
    state::{AppState, RunEvent},
    ws,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/styles.css", get(styles))
        .route("/static/app.js", get(script))
        .route("/runs", post(start_run))
        .route("/runs/:run_id", get(get_run))
        .route("/ws/events", get(ws::events_socket))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(ui::index_html())
}

async fn styles() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        ui::styles_css(),
    )
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        ui::app_js(),
    )
}

async fn start_run(
    State(state): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let run_id = state.start_run()?;
    let params = request.into_params();
    info!(run_id, ?params, "starting backtest run");
    state.publish_event(RunEvent::run_started(run_id));

    let report = match state.runner().run(run_id, params).await {
        Ok(report) => report,
        Err(err) => {
            state.publish_event(RunEvent::run_failed(run_id, err.kind(), err.to_string()));
            return Err(err.into());
        }
    };

    let response = RunResponse::from_report(state.runner().symbol(), &report);
    state.record_run(response.clone()).await;
    state.publish_event(RunEvent::run_completed(
        run_id,
        report.summary.months,
        report.summary.final_total,
    ));

    let location = format!("/runs/{run_id}");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    ))
}

async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Json<RunResponse>, ApiError> {
    let run = if run_id == "latest" {
        state.latest_run().await
    } else {
        let id = run_id
            .parse::<u64>()
            .map_err(|_| ApiError::InvalidRunId(run_id.clone()))?;
        state.find_run(id).await
    };

    run.map(Json).ok_or(ApiError::RunNotFound)
}
