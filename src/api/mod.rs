//! HTTP surface: routing, the `{code, msg, data}` envelope and error mapping.

mod article;
mod auth;
mod code;
mod tag;

use code::ErrorCode;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Entity, TokenError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub msg: &'static str,
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        code: ErrorCode::Success.code(),
        msg: ErrorCode::Success.message(),
        data: Some(data),
    }))
}

pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/tags", get(tag::list_tags).post(tag::add_tag))
        .route("/tags/{id}", put(tag::edit_tag).delete(tag::delete_tag))
        .route(
            "/articles",
            get(article::list_articles).post(article::add_article),
        )
        .route(
            "/articles/{id}",
            get(article::get_article)
                .put(article::edit_article)
                .delete(article::delete_article),
        )
        .route("/clean", post(clean));

    Router::new()
        .route("/auth", post(auth::get_auth))
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn clean(State(state): State<AppState>, BearerToken(token): BearerToken) -> ApiResult<()> {
    state.gate.clean(&token).await?;
    ok(())
}

/// Caller token from `Authorization: Bearer <t>` or the `token` query parameter.
/// Absent tokens extract as empty and are rejected by the gate.
pub struct BearerToken(pub String);

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|v| v.trim().to_string());

        let token = from_header
            .or_else(|| {
                Query::<TokenQuery>::try_from_uri(&parts.uri)
                    .ok()
                    .and_then(|Query(q)| q.token)
            })
            .unwrap_or_default();

        Ok(BearerToken(token))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Auth(TokenError::Expired) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::AuthCheckTokenTimeout)
            }
            AppError::Auth(TokenError::Signing(_)) => {
                tracing::error!(error = %self, "Token signing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::AuthToken)
            }
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, ErrorCode::AuthCheckTokenFail),
            AppError::Validation(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidParams)
            }
            AppError::NotFound(Entity::Tag) => (StatusCode::OK, ErrorCode::NotExistTag),
            AppError::NotFound(Entity::Article) => (StatusCode::OK, ErrorCode::NotExistArticle),
            AppError::TagExists(_) => (StatusCode::OK, ErrorCode::ExistTag),
            _ => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Error)
            }
        };

        let body = ApiResponse::<()> {
            code: code.code(),
            msg: code.message(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::db::Database;

    async fn app() -> Router {
        let db = Database::open_in_memory().await.unwrap();
        let config = Config {
            jwt_secret: "test-secret".to_string(),
            page_size: 2,
            ..Config::default()
        };
        router(AppState::with_database(&config, &db))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn token(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth",
            Some(json!({"username": "admin", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/api/v1/tags", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 20001);
    }

    #[tokio::test]
    async fn auth_requires_credentials() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth",
            Some(json!({"username": "", "password": "pw"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn tag_and_article_round_trip_over_http() {
        let app = app().await;
        let token = token(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/tags?token={token}"),
            Some(json!({"name": "go", "state": 1, "created_by": "a"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], 1);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/tags?token={token}"),
            Some(json!({"name": "go", "state": 1, "created_by": "a"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 10001);

        let article = json!({
            "tag_id": 1, "title": "T", "desc": "D", "content": "C",
            "cover_image_url": "https://example.com/c.png", "created_by": "a", "state": 1
        });
        let (_, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/articles?token={token}"),
            Some(article),
        )
        .await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["id"], 1);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/articles/1?token={token}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["desc"], "D");
        assert_eq!(body["data"]["tag"]["name"], "go");
    }

    #[tokio::test]
    async fn unknown_rows_map_to_business_codes() {
        let app = app().await;
        let token = token(&app).await;

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/articles/9?token={token}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 10003);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/tags/4?token={token}"),
            Some(json!({"state": 0, "modified_by": "b"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 10002);

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/v1/articles/abc?token={token}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tag_listing_pages_with_configured_size() {
        let app = app().await;
        let token = token(&app).await;
        for name in ["a", "b", "c"] {
            send(
                &app,
                Method::POST,
                &format!("/api/v1/tags?token={token}"),
                Some(json!({"name": name, "state": 1, "created_by": "x"})),
            )
            .await;
        }

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/tags?token={token}&page_num=1"),
            None,
        )
        .await;
        assert_eq!(body["data"]["total"], 3);
        assert_eq!(body["data"]["list"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["list"][0]["name"], "c");

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/v1/tags?token={token}&state=5"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn expired_token_reports_timeout_code() {
        let app = app().await;
        let expired = crate::auth::TokenService::new("test-secret", "blog-api", chrono::Duration::hours(-1))
            .issue("admin", "pw")
            .unwrap();

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/tags?token={expired}"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 20002);
    }

    #[tokio::test]
    async fn edit_with_unknown_state_is_invalid_params() {
        let app = app().await;
        let token = token(&app).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/articles/1?token={token}"),
            Some(json!({"state": 2, "modified_by": "b"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }
}
