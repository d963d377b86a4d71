use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::require_text;
use crate::state::AppState;

use super::{ok, ApiResult};

const CREDENTIAL_MAX: usize = 50;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthToken {
    token: String,
}

/// Issues a token embedding the supplied credentials. They are not checked
/// against any user store.
pub async fn get_auth(
    State(state): State<AppState>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> ApiResult<AuthToken> {
    let Json(req) = body?;
    require_text("username", &req.username, CREDENTIAL_MAX)?;
    require_text("password", &req.password, CREDENTIAL_MAX)?;

    let token = state.gate.issue_token(&req.username, &req.password)?;
    ok(AuthToken { token })
}
