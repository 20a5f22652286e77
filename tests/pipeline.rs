//! Request pipeline tests: interceptor, filters and logger working together.

use app_scaffold::config::NodeEnv;
use app_scaffold::http::{with_pipeline, AppError, AppState, HttpException, HttpServer};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn send(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn throwing_root(state: AppState) -> Router {
    let routes = Router::new().route(
        "/",
        get(|| async {
            Err::<&'static str, AppError>(
                HttpException::new(StatusCode::INTERNAL_SERVER_ERROR, "123").into(),
            )
        }),
    );
    with_pipeline(routes, state)
}

#[tokio::test]
async fn test_hello_world_logs_one_info_line() {
    let (state, info, errors) = common::state(NodeEnv::Dev);
    let router = HttpServer::new(state).router();

    let response = send(router, get_request("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Hello World!");

    let lines = info.lines();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.contains("] INFO: HTTP Request: method=GET, url=/, body={}"));
    assert!(line.contains(r#"response="Hello World!""#));

    let delay = line
        .rsplit("delay=")
        .next()
        .and_then(|d| d.strip_suffix("ms"))
        .and_then(|d| d.parse::<u64>().ok());
    assert!(delay.is_some(), "latency is a non-negative integer: {}", line);
    assert!(errors.lines().is_empty());
}

#[tokio::test]
async fn test_dev_http_error_full_body_and_error_log() {
    let (state, info, errors) = common::state(NodeEnv::Dev);

    let response = send(throwing_root(state), get_request("/")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["statusCode"], 500);
    assert_eq!(body["path"], "/");
    assert_eq!(body["message"], "123");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body.as_object().unwrap().len(), 4);

    let lines = errors.lines();
    assert_eq!(lines.len(), 1);
    let payload: Value =
        serde_json::from_str(lines[0].split("] ERROR: ").nth(1).unwrap()).unwrap();
    assert_eq!(payload["method"], "GET");
    assert_eq!(payload["url"], "/");
    assert_eq!(payload["statusCode"], 500);
    assert_eq!(payload["message"], "123");
    assert!(payload["stack"]
        .as_str()
        .unwrap()
        .starts_with("HttpException: 123"));

    // The interceptor stays silent for faulted requests.
    assert_eq!(info.lines(), lines);
}

#[tokio::test]
async fn test_prod_http_error_status_only() {
    let (state, _, errors) = common::state(NodeEnv::Prod);

    let response = send(throwing_root(state), get_request("/")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "statusCode": 500 }));
    assert_eq!(errors.lines().len(), 1);
}

#[tokio::test]
async fn test_test_mode_http_error_status_only() {
    let (state, _, errors) = common::state(NodeEnv::Test);

    let response = send(throwing_root(state), get_request("/")).await;
    assert_eq!(body_json(response).await, json!({ "statusCode": 500 }));
    assert_eq!(errors.lines().len(), 1);
}

#[tokio::test]
async fn test_exception_route() {
    let (state, _, errors) = common::state(NodeEnv::Dev);
    let router = HttpServer::new(state).router();

    let response = send(router, get_request("/exception")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "123");
    assert!(errors.lines()[0].contains(r#""url":"/exception""#));
}

#[tokio::test]
async fn test_internal_error_never_leaks() {
    for node_env in [NodeEnv::Dev, NodeEnv::Prod, NodeEnv::Test] {
        let (state, _, errors) = common::state(node_env);
        let routes = Router::new().route(
            "/",
            get(|| async {
                Err::<&'static str, AppError>(anyhow::anyhow!("connection pool exhausted").into())
            }),
        );

        let response = send(with_pipeline(routes, state), get_request("/")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "statusCode": 500 }));

        let lines = errors.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(r#""message":"Internal server error""#));
        assert!(lines[0].contains("connection pool exhausted"));
    }
}

#[tokio::test]
async fn test_panic_becomes_500() {
    let (state, info, errors) = common::state(NodeEnv::Dev);
    let routes = Router::new().route(
        "/",
        get(|| async {
            let fail = true;
            if fail {
                panic!("handler bug");
            }
            "unreachable"
        }),
    );

    let response = send(with_pipeline(routes, state), get_request("/")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "statusCode": 500 }));

    let lines = errors.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("handler bug"));
    assert_eq!(info.lines().len(), 1);
}

#[tokio::test]
async fn test_unknown_route_is_404_fault() {
    let (state, _, errors) = common::state(NodeEnv::Dev);
    let router = HttpServer::new(state).router();

    let response = send(router, get_request("/missing?x=1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Cannot GET /missing");
    assert_eq!(body["path"], "/missing?x=1");
    assert!(errors.lines()[0].contains(r#""statusCode":404"#));
}

#[tokio::test]
async fn test_request_body_logged_and_forwarded() {
    let (state, info, _) = common::state(NodeEnv::Dev);
    let routes = Router::new().route("/echo", post(|body: String| async move { body }));

    let request = Request::builder()
        .method("POST")
        .uri("/echo?verbose=true")
        .header("content-type", "application/json")
        .body(Body::from(r#"{ "name": "ada" }"#))
        .unwrap();

    let response = send(with_pipeline(routes, state), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, br#"{ "name": "ada" }"#);

    let line = &info.lines()[0];
    assert!(line.contains(
        r#"method=POST, url=/echo?verbose=true, body={"name":"ada"}, response={"name":"ada"}"#
    ));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let (state, info, errors) = common::state(NodeEnv::Prod);
    let routes = Router::new().route("/upload", post(|_body: String| async { "ok" }));

    let size = 3 * 1024 * 1024;
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-length", size.to_string())
        .body(Body::from(vec![b'a'; size]))
        .unwrap();

    let response = send(with_pipeline(routes, state), request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await, json!({ "statusCode": 413 }));
    assert_eq!(errors.lines().len(), 1);
    assert_eq!(info.lines().len(), 1);
}

#[tokio::test]
async fn test_oversized_body_without_length_header_rejected() {
    let (state, _, errors) = common::state(NodeEnv::Dev);
    let routes = Router::new().route("/upload", post(|_body: String| async { "ok" }));

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .body(Body::from(vec![b'a'; 3 * 1024 * 1024]))
        .unwrap();
    assert!(request.headers().get("content-length").is_none());

    let response = send(with_pipeline(routes, state), request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["message"], "Payload Too Large");
    assert!(errors.lines()[0].contains(r#""statusCode":413"#));
}

#[tokio::test]
async fn test_concurrent_requests_each_logged_once() {
    let (state, info, _) = common::state(NodeEnv::Dev);
    let router = HttpServer::new(state).router();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let router = router.clone();
            tokio::spawn(async move { send(router, get_request("/")).await.status() })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }
    let lines = info.lines();
    assert_eq!(lines.len(), 32);
    assert!(lines.iter().all(|l| l.contains("method=GET, url=/,")));
}
