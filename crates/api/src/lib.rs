pub mod dto;
pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use runtime::BacktestRunner;

pub fn app(runner: Arc<BacktestRunner>) -> Router {
    routes::router(state::AppState::new(runner))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
        Router,
    };
    use core_sim::{MonthlySeriesGenerator, PricePoint};
    use futures_util::StreamExt;
    use serde_json::Value;
    use time::macros::date;
    use tokio_tungstenite::tungstenite::Message;
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::state::{tests::state_with_prices, RunEvent};

    fn generated_prices() -> Vec<PricePoint> {
        MonthlySeriesGenerator::new(3, date!(2015 - 01 - 01), 17_164.0, 0.05).take_months(36)
    }

    fn app_with(points: Vec<PricePoint>) -> Router {
        router(state_with_prices(points))
    }

    fn post_run(body: &str) -> Request<Body> {
        Request::post("/runs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn post_runs_runs_backtest_and_returns_snapshots() {
        let app = app_with(generated_prices());

        let response = app.oneshot(post_run(r#"{"capital":12000}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/runs/1");
        let body = json_body(response).await;
        assert_eq!(body["run_id"], 1);
        assert_eq!(body["symbol"], "^DJI");
        assert_eq!(body["params"]["capital"], 12_000.0);
        assert_eq!(body["snapshots"].as_array().unwrap().len(), 36);
        assert_eq!(body["snapshots"][0]["date"], "2015-01-01");
        assert_eq!(body["summary"]["months"], 36);
    }

    #[tokio::test]
    async fn invalid_parameters_are_unprocessable() {
        let app = app_with(generated_prices());

        let response = app
            .oneshot(post_run(r#"{"dip_multiplier":0}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"], "input_error");
    }

    #[tokio::test]
    async fn empty_price_series_is_unprocessable() {
        let app = app_with(Vec::new());

        let response = app.oneshot(post_run("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn latest_run_is_served_after_a_run() {
        let app = app_with(generated_prices());

        let missing = app
            .clone()
            .oneshot(Request::get("/runs/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let created = app.clone().oneshot(post_run("{}")).await.unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let latest = app
            .clone()
            .oneshot(Request::get("/runs/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(latest.status(), StatusCode::OK);
        assert_eq!(json_body(latest).await["run_id"], 1);

        let by_id = app
            .oneshot(Request::get("/runs/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(by_id.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_run_id_is_a_bad_request() {
        let app = app_with(generated_prices());

        let response = app
            .oneshot(Request::get("/runs/first").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dashboard_and_assets_are_served() {
        let app = app_with(Vec::new());

        let index = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);

        let script = app
            .oneshot(Request::get("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(script.status(), StatusCode::OK);
        assert_eq!(
            script.headers()[header::CONTENT_TYPE],
            "text/javascript; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn websocket_streams_connected_then_published_events() {
        let state = state_with_prices(Vec::new());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/events"))
            .await
            .unwrap();

        let connected = next_json(&mut socket).await;
        assert_eq!(connected["event_type"], "connected");
        assert_eq!(connected["latest_run_id"], Value::Null);

        state.publish_event(RunEvent::run_started(9));

        let started = next_json(&mut socket).await;
        assert_eq!(started["event_type"], "run_started");
        assert_eq!(started["run_id"], 9);
    }

    async fn next_json<S>(socket: &mut S) -> Value
    where
        S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
            + Unpin,
    {
        let message = tokio::time::timeout(std::time::Duration::from_secs(5), socket.next())
            .await
            .expect("event should arrive")
            .expect("socket should stay open")
            .expect("message should be valid");
        match message {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text message, got {other:?}"),
        }
    }
}
