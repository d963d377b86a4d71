//! Policy layer in front of the repositories.
//!
//! Every operation verifies the caller's token first, then runs the existence
//! checks it needs, and only then touches storage. The checks and the mutation
//! are separate store calls, so an entity can change between them.

use serde::Serialize;

use crate::auth::{Claims, TokenService};
use crate::db::{ArticleRepository, Database, TagRepository};
use crate::error::{AppError, Entity, Result};
use crate::models::{
    require_id, Article, ArticleFilter, ArticlePatch, NewArticle, NewTag, Tag, TagFilter,
    TagPatch,
};

/// One page of a listing plus the total matching row count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total: i64,
}

#[derive(Clone)]
pub struct RequestGate {
    tokens: TokenService,
    tags: TagRepository,
    articles: ArticleRepository,
}

impl RequestGate {
    pub fn new(tokens: TokenService, db: &Database) -> Self {
        Self {
            tokens,
            tags: db.tags(),
            articles: db.articles(),
        }
    }

    pub fn issue_token(&self, username: &str, password: &str) -> Result<String> {
        let token = self.tokens.issue(username, password)?;
        tracing::info!(username, "Issued token");
        Ok(token)
    }

    pub fn authorize(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AppError::Auth(e)
        })
    }

    // Tags

    pub async fn list_tags(
        &self,
        token: &str,
        page_num: u32,
        page_size: u32,
        filter: TagFilter,
    ) -> Result<Page<Tag>> {
        self.authorize(token)?;
        let total = self.tags.count(filter.clone()).await?;
        let list = self.tags.list(page_num, page_size, filter).await?;
        Ok(Page { list, total })
    }

    pub async fn add_tag(&self, token: &str, tag: NewTag) -> Result<i64> {
        let claims = self.authorize(token)?;
        tag.validate()?;
        if self.tags.exists_by_name(&tag.name).await? {
            return Err(AppError::TagExists(tag.name));
        }

        let id = self.tags.add(tag).await?;
        tracing::info!(id, by = %claims.username, "Tag created");
        Ok(id)
    }

    pub async fn edit_tag(&self, token: &str, id: i64, patch: TagPatch) -> Result<()> {
        let claims = self.authorize(token)?;
        require_id("id", id)?;
        patch.validate()?;
        self.require_tag(id).await?;
        if let Some(name) = &patch.name {
            match self.tags.find_id_by_name(name).await? {
                Some(holder) if holder != id => return Err(AppError::TagExists(name.clone())),
                _ => {}
            }
        }

        self.tags.edit(id, patch).await?;
        tracing::info!(id, by = %claims.username, "Tag edited");
        Ok(())
    }

    pub async fn delete_tag(&self, token: &str, id: i64) -> Result<()> {
        let claims = self.authorize(token)?;
        require_id("id", id)?;
        self.require_tag(id).await?;

        self.tags.delete(id).await?;
        tracing::info!(id, by = %claims.username, "Tag deleted");
        Ok(())
    }

    // Articles

    pub async fn get_article(&self, token: &str, id: i64) -> Result<Article> {
        self.authorize(token)?;
        require_id("id", id)?;
        self.require_article(id).await?;

        // The row may have been deleted after the existence check.
        self.articles
            .get(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Article))
    }

    pub async fn list_articles(
        &self,
        token: &str,
        page_num: u32,
        page_size: u32,
        filter: ArticleFilter,
    ) -> Result<Page<Article>> {
        self.authorize(token)?;
        if let Some(tag_id) = filter.tag_id {
            require_id("tag_id", tag_id)?;
        }
        let total = self.articles.count(filter.clone()).await?;
        let list = self.articles.list(page_num, page_size, filter).await?;
        Ok(Page { list, total })
    }

    pub async fn add_article(&self, token: &str, article: NewArticle) -> Result<i64> {
        let claims = self.authorize(token)?;
        article.validate()?;
        self.require_tag(article.tag_id).await?;

        let id = self.articles.add(article).await?;
        tracing::info!(id, by = %claims.username, "Article created");
        Ok(id)
    }

    pub async fn edit_article(&self, token: &str, id: i64, patch: ArticlePatch) -> Result<()> {
        let claims = self.authorize(token)?;
        require_id("id", id)?;
        patch.validate()?;
        if let Some(tag_id) = patch.tag_id {
            self.require_tag(tag_id).await?;
        }
        self.require_article(id).await?;

        self.articles.edit(id, patch).await?;
        tracing::info!(id, by = %claims.username, "Article edited");
        Ok(())
    }

    pub async fn delete_article(&self, token: &str, id: i64) -> Result<()> {
        let claims = self.authorize(token)?;
        require_id("id", id)?;
        self.require_article(id).await?;

        self.articles.delete(id).await?;
        tracing::info!(id, by = %claims.username, "Article deleted");
        Ok(())
    }

    pub async fn clean(&self, token: &str) -> Result<()> {
        let claims = self.authorize(token)?;
        self.clean_all().await;
        tracing::info!(by = %claims.username, "Purged deleted rows");
        Ok(())
    }

    /// Purges soft-deleted tags and articles without a caller token.
    pub async fn clean_all(&self) {
        self.tags.clean().await;
        self.articles.clean().await;
    }

    async fn require_tag(&self, id: i64) -> Result<()> {
        if !self.tags.exists_by_id(id).await? {
            return Err(AppError::NotFound(Entity::Tag));
        }
        Ok(())
    }

    async fn require_article(&self, id: i64) -> Result<()> {
        if !self.articles.exists_by_id(id).await? {
            return Err(AppError::NotFound(Entity::Article));
        }
        Ok(())
    }
}
