use super::*;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use shared::domain::{District, RamenType};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    seen: Arc<Mutex<Option<oneshot::Sender<(Option<String>, serde_json::Value)>>>>,
}

async fn handle_recommend(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let json = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    if let Some(tx) = state.seen.lock().await.take() {
        let _ = tx.send((content_type, json));
    }
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, state.body)
}

async fn spawn_recommend_server(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> (String, oneshot::Receiver<(Option<String>, serde_json::Value)>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        status,
        body,
        delay,
        seen: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/recommend", post(handle_recommend))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

fn sample_request() -> RecommendRequest {
    RecommendRequest {
        districts: vec![District::Shibuya, District::Nakano],
        ramen_types: vec![RamenType::Miso],
        min_price: 700,
        max_price: 1400,
    }
}

fn service(base_url: &str) -> HttpRecommendationService {
    HttpRecommendationService::with_timeout(base_url, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn posts_json_payload_and_returns_message() {
    let (base_url, seen_rx) = spawn_recommend_server(
        StatusCode::OK,
        r##"{"message":"# Best pick\n\n**Shibuya Miso**"}"##,
        Duration::ZERO,
    )
    .await;

    let text = service(&format!("{base_url}/"))
        .recommend(&sample_request())
        .await
        .expect("success");
    assert_eq!(text, "# Best pick\n\n**Shibuya Miso**");

    let (content_type, body) = seen_rx.await.expect("request seen");
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        serde_json::json!({
            "districts": ["渋谷区", "中野区"],
            "ramenTypes": ["味噌"],
            "minPrice": 700,
            "maxPrice": 1400,
        })
    );
}

#[tokio::test]
async fn non_success_status_is_service_error() {
    let (base_url, _seen) =
        spawn_recommend_server(StatusCode::BAD_GATEWAY, "upstream down", Duration::ZERO).await;

    let err = service(&base_url)
        .recommend(&sample_request())
        .await
        .expect_err("must fail");
    assert_eq!(err, SubmissionError::Service { status: 502 });
    assert!(err.user_message().contains("502"));
}

#[tokio::test]
async fn missing_message_field_is_decoding_error() {
    let (base_url, _seen) =
        spawn_recommend_server(StatusCode::OK, r#"{"msg":"hello"}"#, Duration::ZERO).await;

    let err = service(&base_url)
        .recommend(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, SubmissionError::Decoding(_)), "{err:?}");
}

#[tokio::test]
async fn non_string_message_is_decoding_error() {
    let (base_url, _seen) =
        spawn_recommend_server(StatusCode::OK, r#"{"message":["a"]}"#, Duration::ZERO).await;

    let err = service(&base_url)
        .recommend(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, SubmissionError::Decoding(_)), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = service(&format!("http://{addr}"))
        .recommend(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, SubmissionError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn empty_base_url_is_transport_error() {
    let client = HttpRecommendationService::new(&Settings::default()).expect("client");
    assert_eq!(client.endpoint(), "/recommend");

    let err = client
        .recommend(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, SubmissionError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn slow_service_times_out_as_transport_error() {
    let (base_url, _seen) = spawn_recommend_server(
        StatusCode::OK,
        r#"{"message":"late"}"#,
        Duration::from_secs(5),
    )
    .await;

    let client = HttpRecommendationService::with_timeout(&base_url, Duration::from_millis(200))
        .expect("client");
    let err = client
        .recommend(&sample_request())
        .await
        .expect_err("must time out");
    assert!(matches!(err, SubmissionError::Transport(_)), "{err:?}");
}
