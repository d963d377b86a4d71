use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::gate::Page;
use crate::models::{
    require_text, Article, ArticleFilter, ArticlePatch, NewArticle, State as PublishState,
    AUTHOR_MAX,
};
use crate::state::AppState;

use super::{ok, ApiResult, BearerToken, Created};

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    tag_id: Option<i64>,
    state: Option<PublishState>,
    #[serde(default)]
    page_num: u32,
}

pub async fn get_article(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Article> {
    state.gate.authorize(&token)?;
    let Path(id) = id?;
    let article = state.gate.get_article(&token, id).await?;
    ok(article)
}

pub async fn list_articles(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    query: Result<Query<ArticleQuery>, QueryRejection>,
) -> ApiResult<Page<Article>> {
    state.gate.authorize(&token)?;
    let Query(query) = query?;
    let filter = ArticleFilter {
        tag_id: query.tag_id,
        state: query.state,
    };
    let page = state
        .gate
        .list_articles(&token, query.page_num, state.page_size, filter)
        .await?;
    ok(page)
}

pub async fn add_article(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Result<Json<NewArticle>, JsonRejection>,
) -> ApiResult<Created> {
    state.gate.authorize(&token)?;
    let Json(article) = body?;
    let id = state.gate.add_article(&token, article).await?;
    ok(Created { id })
}

pub async fn edit_article(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ArticlePatch>, JsonRejection>,
) -> ApiResult<()> {
    state.gate.authorize(&token)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    require_text("modified_by", patch.modified_by.as_deref().unwrap_or_default(), AUTHOR_MAX)?;

    state.gate.edit_article(&token, id, patch).await?;
    ok(())
}

pub async fn delete_article(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    state.gate.authorize(&token)?;
    let Path(id) = id?;
    state.gate.delete_article(&token, id).await?;
    ok(())
}
