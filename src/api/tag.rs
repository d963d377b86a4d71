use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::gate::Page;
use crate::models::{require_text, NewTag, State as PublishState, Tag, TagFilter, TagPatch, AUTHOR_MAX};
use crate::state::AppState;

use super::{ok, ApiResult, BearerToken, Created};

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    name: Option<String>,
    state: Option<PublishState>,
    #[serde(default)]
    page_num: u32,
}

#[derive(Debug, Deserialize)]
pub struct EditTagRequest {
    name: Option<String>,
    state: Option<PublishState>,
    modified_by: String,
}

pub async fn list_tags(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    query: Result<Query<TagQuery>, QueryRejection>,
) -> ApiResult<Page<Tag>> {
    state.gate.authorize(&token)?;
    let Query(query) = query?;
    let filter = TagFilter {
        name: query.name,
        state: query.state,
    };
    let page = state
        .gate
        .list_tags(&token, query.page_num, state.page_size, filter)
        .await?;
    ok(page)
}

pub async fn add_tag(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Result<Json<NewTag>, JsonRejection>,
) -> ApiResult<Created> {
    state.gate.authorize(&token)?;
    let Json(tag) = body?;
    let id = state.gate.add_tag(&token, tag).await?;
    ok(Created { id })
}

pub async fn edit_tag(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<EditTagRequest>, JsonRejection>,
) -> ApiResult<()> {
    state.gate.authorize(&token)?;
    let Path(id) = id?;
    let Json(req) = body?;
    require_text("modified_by", &req.modified_by, AUTHOR_MAX)?;

    let patch = TagPatch {
        name: req.name,
        state: req.state,
        modified_by: Some(req.modified_by),
    };
    state.gate.edit_tag(&token, id, patch).await?;
    ok(())
}

pub async fn delete_tag(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    state.gate.authorize(&token)?;
    let Path(id) = id?;
    state.gate.delete_tag(&token, id).await?;
    ok(())
}
