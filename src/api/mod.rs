//! HTTP 接口：回执页面、构建信息 JSON 与健康检查

use crate::build_info;
use crate::page::ReceiptPageGenerator;
use crate::provenance::BuildMeta;
use crate::util::logging::standards::events;
use crate::util::{ServerError, WebResult};
use crate::AppState;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

pub fn routes(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.server.request_timeout_secs.max(1));

    Router::new()
        .route("/", get(receipt_page))
        .route("/api/build-meta", get(build_meta))
        .route("/api/health", get(health))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(app_state)
}

/// GET / - 每次请求重新解析并渲染
async fn receipt_page(State(app_state): State<AppState>) -> Result<Html<String>, ServerError> {
    let meta = resolve_blocking(&app_state).await?;
    info!(
        target: "server.http",
        event = events::REQUEST_PAGE,
        commit = %meta.commit_sha_short,
        repo = %meta.repo_slug
    );
    Ok(Html(ReceiptPageGenerator::render(&meta, &app_state.config.page)))
}

/// GET /api/build-meta
async fn build_meta(State(app_state): State<AppState>) -> Result<Json<WebResult>, ServerError> {
    let meta = resolve_blocking(&app_state).await?;
    info!(
        target: "server.http",
        event = events::REQUEST_META,
        commit = %meta.commit_sha_short
    );
    Ok(Json(WebResult::ok(meta)))
}

/// GET /api/health
async fn health() -> Json<WebResult> {
    Json(WebResult::ok(json!({
        "status": "ok",
        "version": build_info::summary(),
    })))
}

/// 版本控制查询会阻塞，放到阻塞线程池执行
async fn resolve_blocking(app_state: &AppState) -> Result<BuildMeta, ServerError> {
    let resolver = app_state.resolver.clone();
    tokio::task::spawn_blocking(move || resolver.resolve())
        .await
        .map_err(|e| {
            error!(
                target: "server.http",
                event = events::REQUEST_ERROR,
                error = %e
            );
            ServerError::Server
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::{BuildMetaResolver, CommandError, CommandRunner};
    use crate::util::config::Config;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    const FULL_SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    struct FixedRunner;

    impl CommandRunner for FixedRunner {
        fn run(&self, args: &[&str]) -> Result<String, CommandError> {
            match args.first().copied() {
                Some("rev-parse") => Ok(FULL_SHA.to_string()),
                Some("remote") => Ok("git@github.com:owner/repo.git".to_string()),
                _ => Err(CommandError::EmptyOutput),
            }
        }
    }

    fn app() -> Router {
        let app_state = AppState {
            config: Config::default(),
            resolver: BuildMetaResolver::new(Arc::new(FixedRunner)),
        };
        routes(app_state)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app().oneshot(get_request("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
        assert!(body["data"]["version"].is_string());
    }

    #[tokio::test]
    async fn test_build_meta_endpoint_returns_record() {
        let response = app().oneshot(get_request("/api/build-meta")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        let data = &body["data"];
        assert_eq!(body["success"], true);
        assert_eq!(data["proofGate"], "PASSED");
        assert_eq!(data["deploymentStatus"], "LIVE");
        assert_eq!(data["commitSha"], FULL_SHA);
        assert_eq!(data["commitShaShort"], "0123456");
        assert_eq!(data["repoSlug"], "owner/repo");
        assert_eq!(data["repoUrl"], "https://github.com/owner/repo");
        assert_eq!(
            data["commitUrl"],
            format!("https://github.com/owner/repo/commit/{FULL_SHA}")
        );
        assert!(data["buildTimestamp"].is_string());
    }

    #[tokio::test]
    async fn test_receipt_page_is_html() {
        let response = app().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let body = body_string(response).await;
        assert!(body.contains("Build Receipt"));
        assert!(body.contains("PROOF_GATE"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app().oneshot(get_request("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
