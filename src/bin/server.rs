use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::rejection::JsonRejection;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use hospital_levelgen_rust_server::level::{generate, GenerateOptions, GeneratedLevel};
use hospital_levelgen_rust_server::log::emit_log;
use hospital_levelgen_rust_server::server_utils::{
    parse_format, parse_optional_i32, parse_optional_u32, resolve_port, OutputFormat,
};
use hospital_levelgen_rust_server::types::GenerationOutcome;
use serde::Deserialize;
use serde_json::json;
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const DEFAULT_LEVEL: u32 = 1;

#[derive(Debug, Default, Deserialize)]
struct LevelQuery {
    level: Option<String>,
    seed: Option<String>,
    width: Option<String>,
    height: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LevelRequest {
    #[serde(default = "default_level")]
    level: u32,
    #[serde(default)]
    options: GenerateOptions,
    #[serde(default)]
    format: Option<String>,
}

fn default_level() -> u32 {
    DEFAULT_LEVEL
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[tokio::main]
async fn main() {
    let port = resolve_port(std::env::var("PORT").ok().as_deref(), 8080);
    let app = build_router();

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        println!("[server] static file root: {}", static_dir.to_string_lossy());
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        eprintln!("[server] static file root not found. set STATIC_DIR to serve a level viewer.");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(error) => {
            emit_log(
                "error",
                "bind_failed",
                "server",
                None,
                json!({ "addr": bind_addr, "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    println!("[server] listening on :{port}");
    if let Err(error) = axum::serve(listener, app).await {
        emit_log(
            "error",
            "server_failed",
            "server",
            None,
            json!({ "error": error.to_string() }),
        );
        std::process::exit(1);
    }
}

fn build_router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/level", get(get_level).post(post_level))
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("viewer"), PathBuf::from("dist/viewer")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

fn make_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{id}")
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

fn request_from_query(query: &LevelQuery) -> Result<(u32, GenerateOptions, OutputFormat), String> {
    let level = parse_optional_u32("level", query.level.as_deref())?.unwrap_or(DEFAULT_LEVEL);
    let options = GenerateOptions {
        seed: parse_optional_u32("seed", query.seed.as_deref())?,
        width: parse_optional_i32("width", query.width.as_deref())?,
        height: parse_optional_i32("height", query.height.as_deref())?,
        ..GenerateOptions::default()
    };
    Ok((level, options, parse_format(query.format.as_deref())))
}

async fn get_level(Query(query): Query<LevelQuery>) -> Response {
    match request_from_query(&query) {
        Ok((level, options, format)) => respond(level, options, format).await,
        Err(message) => ApiError::BadRequest(message).into_response(),
    }
}

async fn post_level(body: Result<Json<LevelRequest>, JsonRejection>) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiError::BadRequest(rejection.body_text()).into_response(),
    };
    let format = parse_format(request.format.as_deref());
    respond(request.level, request.options, format).await
}

async fn respond(level: u32, options: GenerateOptions, format: OutputFormat) -> Response {
    let request_id = make_id("req");
    match run_generation(level, options).await {
        Ok(generated) => {
            log_generated(&request_id, &generated);
            render(generated, format)
        }
        Err(error) => {
            let message = match &error {
                ApiError::BadRequest(message) | ApiError::Internal(message) => message.clone(),
            };
            emit_log(
                "warn",
                "level_rejected",
                &request_id,
                None,
                json!({ "level": level, "error": message }),
            );
            error.into_response()
        }
    }
}

async fn run_generation(level: u32, options: GenerateOptions) -> Result<GeneratedLevel, ApiError> {
    let result = tokio::task::spawn_blocking(move || generate(level, &options))
        .await
        .map_err(|error| ApiError::Internal(format!("generation task failed: {error}")))?;
    result.map_err(|error| ApiError::BadRequest(error.to_string()))
}

fn log_generated(request_id: &str, generated: &GeneratedLevel) {
    let report = &generated.report;
    let level = if report.outcome == GenerationOutcome::Degraded {
        "warn"
    } else {
        "info"
    };
    emit_log(
        level,
        "level_generated",
        request_id,
        Some(generated.seed),
        json!({
            "level": generated.level,
            "width": generated.width,
            "height": generated.height,
            "outcome": report.outcome,
            "warnings": report.warnings,
            "elapsedMs": report.elapsed_ms,
        }),
    );
}

fn render(generated: GeneratedLevel, format: OutputFormat) -> Response {
    match format {
        OutputFormat::Json => Json(generated).into_response(),
        OutputFormat::Ascii => {
            let mut body = generated.ascii.join("\n");
            body.push('\n');
            ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::FromRequest;
    use axum::http::Request;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    fn query(level: Option<&str>, seed: Option<&str>, size: Option<&str>) -> LevelQuery {
        LevelQuery {
            level: level.map(str::to_string),
            seed: seed.map(str::to_string),
            width: size.map(str::to_string),
            height: size.map(str::to_string),
            format: None,
        }
    }

    #[test]
    fn query_defaults_to_level_one_json() {
        let (level, options, format) =
            request_from_query(&LevelQuery::default()).expect("empty query is valid");
        assert_eq!(level, 1);
        assert_eq!(options, GenerateOptions::default());
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn query_rejects_non_numeric_seed() {
        let error = request_from_query(&query(None, Some("abc"), None)).expect_err("should fail");
        assert!(error.contains("seed"));
    }

    #[test]
    fn post_body_parses_nested_options() {
        let request: LevelRequest =
            serde_json::from_str(r#"{"level": 2, "options": {"seed": 9, "width": 100}}"#)
                .expect("request should parse");
        assert_eq!(request.level, 2);
        assert_eq!(request.options.seed, Some(9));
        assert_eq!(request.options.width, Some(100));
        let bare: LevelRequest = serde_json::from_str("{}").expect("empty body should parse");
        assert_eq!(bare.level, 1);
    }

    #[tokio::test]
    async fn get_level_returns_generated_json() {
        let response = get_level(Query(query(Some("1"), Some("42"), Some("120")))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["seed"], 42);
        assert_eq!(body["width"], 120);
        assert_eq!(body["report"]["bossDoorCount"], 1);
        assert_eq!(body["ascii"].as_array().map(Vec::len), Some(120));
    }

    #[tokio::test]
    async fn invalid_level_is_a_bad_request() {
        let response = get_level(Query(query(Some("12"), None, Some("120")))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().is_some_and(|text| text.contains("level")));
    }

    #[tokio::test]
    async fn post_level_can_render_ascii() {
        let request = LevelRequest {
            level: 1,
            options: GenerateOptions {
                seed: Some(5),
                width: Some(100),
                height: Some(100),
                ..GenerateOptions::default()
            },
            format: Some("ascii".to_string()),
        };
        let response = post_level(Ok(Json(request))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let text = String::from_utf8(bytes.to_vec()).expect("ascii body is utf-8");
        assert_eq!(text.lines().count(), 100);
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/level")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"level": -1}"#))
            .expect("request should build");
        let body = Json::<LevelRequest>::from_request(request, &()).await;
        assert!(body.is_err());
        let response = post_level(body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().is_some_and(|text| !text.is_empty()));
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let response = healthz().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ok"], true);
    }
}
