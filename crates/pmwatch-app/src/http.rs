use axum::{
    extract::State,
    http::Method,
    response::Html,
    routing::get,
    Json, Router,
};
use pmwatch_core::{render_current, Link, ReadingView, SharedReading};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Clone)]
pub struct AppState {
    pub shared: SharedReading,
    pub link: Link,
}

#[derive(Debug, Serialize)]
struct Health {
    link: String,
    uptime_ms: u64,
    last_capture_ms: u64,
    frames: u64,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/", get(index))
        .route("/api/data", get(api_data).layer(cors))
        .route("/health", get(health))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn api_data(State(state): State<AppState>) -> Json<ReadingView> {
    Json(render_current(&state.shared))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let snap = state.shared.read();
    Json(Health {
        link: state.link.state().to_string(),
        uptime_ms: state.shared.clock().now_ms(),
        last_capture_ms: snap.captured_at_ms,
        frames: snap.sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use pmwatch_core::{LinkState, ServiceClock};
    use pmwatch_decode::MeasurementRecord;
    use serde_json::Value;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            shared: SharedReading::new(ServiceClock::start()),
            link: Link::new(),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let req = Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "http://example.net")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn data_before_first_frame_is_all_zero() {
        let (status, headers, body) = get_json(router(state()), "/api/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body["timestamp"], 0);
        for group in ["pm_cf", "pm_ae", "counts"] {
            let fields = body[group].as_object().unwrap();
            assert!(fields.values().all(|v| v == 0), "{group}: {fields:?}");
        }
        assert_eq!(body["counts"].as_object().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn data_reflects_latest_publish() {
        let st = state();
        st.shared.publish(
            MeasurementRecord {
                pm2_5_ae: 35,
                count_03um: 1234,
                ..Default::default()
            },
            5_000,
        );
        let (_, _, body) = get_json(router(st), "/api/data").await;
        assert_eq!(body["pm_ae"]["pm2_5"], 35);
        assert_eq!(body["counts"]["count_03um"], 1234);
        assert_eq!(body["timestamp"], 5_000);
    }

    #[tokio::test]
    async fn health_reports_link_and_capture_time() {
        let st = state();
        st.link.set(LinkState::Connected);
        st.shared.publish(MeasurementRecord::default(), 7);
        let (status, _, body) = get_json(router(st), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["link"], "connected");
        assert_eq!(body["last_capture_ms"], 7);
        assert_eq!(body["frames"], 1);
    }

    #[tokio::test]
    async fn index_serves_page() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = router(state()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("/api/data"));
    }
}
