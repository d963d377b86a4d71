use std::collections::{BTreeSet, HashMap};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Article, ArticleFilter, ArticlePatch, NewArticle, Tag};

use super::tag_repository::{tag_from_row, TAG_COLUMNS};
use super::{active_where, now, page_bounds, update_statement, Column};

const ARTICLE_COLUMNS: &str = "id, tag_id, title, description, content, cover_image_url, \
     created_by, modified_by, state, created_on, modified_on, deleted_on";

#[derive(Clone)]
pub struct ArticleRepository {
    conn: Connection,
}

impl ArticleRepository {
    pub(super) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let exists = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM blog_article WHERE id = ?1 AND deleted_on = 0",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }

    /// Fetches an active article and then its tag. A missing tag leaves `tag` empty.
    pub async fn get(&self, id: i64) -> Result<Option<Article>> {
        let article = self
            .conn
            .call(move |conn| {
                let article = conn
                    .query_row(
                        &format!(
                            "SELECT {ARTICLE_COLUMNS} FROM blog_article WHERE id = ?1 AND deleted_on = 0"
                        ),
                        params![id],
                        article_from_row,
                    )
                    .optional()?;

                let Some(mut article) = article else {
                    return Ok(None);
                };

                article.tag = conn
                    .query_row(
                        &format!("SELECT {TAG_COLUMNS} FROM blog_tag WHERE id = ?1 AND deleted_on = 0"),
                        params![article.tag_id],
                        tag_from_row,
                    )
                    .optional()?;
                Ok(Some(article))
            })
            .await?;
        Ok(article)
    }

    /// Lists a page of active articles with their tags resolved in one extra query.
    pub async fn list(
        &self,
        page_num: u32,
        page_size: u32,
        filter: ArticleFilter,
    ) -> Result<Vec<Article>> {
        let conditions = filter_conditions(filter);
        let articles = self
            .conn
            .call(move |conn| {
                let sql = format!(
                    "SELECT {ARTICLE_COLUMNS} FROM blog_article{} ORDER BY id LIMIT ? OFFSET ?",
                    active_where(&conditions)
                );
                let values = conditions
                    .into_iter()
                    .map(|(_, value)| value)
                    .chain(page_bounds(page_num, page_size));

                let mut stmt = conn.prepare(&sql)?;
                let mut articles = stmt
                    .query_map(params_from_iter(values), article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                let tag_ids: BTreeSet<i64> = articles.iter().map(|a| a.tag_id).collect();
                if tag_ids.is_empty() {
                    return Ok(articles);
                }

                let placeholders = vec!["?"; tag_ids.len()].join(", ");
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TAG_COLUMNS} FROM blog_tag WHERE deleted_on = 0 AND id IN ({placeholders})"
                ))?;
                let tags: HashMap<i64, Tag> = stmt
                    .query_map(params_from_iter(tag_ids), tag_from_row)?
                    .map(|tag| tag.map(|t| (t.id, t)))
                    .collect::<std::result::Result<_, _>>()?;

                for article in &mut articles {
                    article.tag = tags.get(&article.tag_id).cloned();
                }
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn count(&self, filter: ArticleFilter) -> Result<i64> {
        let conditions = filter_conditions(filter);
        let count = self
            .conn
            .call(move |conn| {
                let sql = format!("SELECT COUNT(*) FROM blog_article{}", active_where(&conditions));
                let values = conditions.into_iter().map(|(_, value)| value);
                let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    /// Inserts an article. The referenced tag must already have been checked by the caller.
    pub async fn add(&self, article: NewArticle) -> Result<i64> {
        article.validate()?;
        tracing::debug!(tag_id = article.tag_id, title = %article.title, "Adding article");

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO blog_article (tag_id, title, description, content, cover_image_url,
                                                 created_by, state, created_on)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                    params![
                        article.tag_id,
                        article.title,
                        article.desc,
                        article.content,
                        article.cover_image_url,
                        article.created_by,
                        article.state,
                        now(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn edit(&self, id: i64, patch: ArticlePatch) -> Result<()> {
        patch.validate()?;

        let mut assignments: Vec<Column> = Vec::new();
        if let Some(tag_id) = patch.tag_id {
            assignments.push(("tag_id", Value::Integer(tag_id)));
        }
        if let Some(title) = patch.title {
            assignments.push(("title", Value::Text(title)));
        }
        if let Some(desc) = patch.desc {
            assignments.push(("description", Value::Text(desc)));
        }
        if let Some(content) = patch.content {
            assignments.push(("content", Value::Text(content)));
        }
        if let Some(cover_image_url) = patch.cover_image_url {
            assignments.push(("cover_image_url", Value::Text(cover_image_url)));
        }
        if let Some(state) = patch.state {
            assignments.push(("state", Value::Integer(state.into())));
        }
        if let Some(modified_by) = patch.modified_by {
            assignments.push(("modified_by", Value::Text(modified_by)));
        }
        let (sql, values) = update_statement("blog_article", id, assignments);

        self.conn
            .call(move |conn| {
                conn.execute(&sql, params_from_iter(values))?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE blog_article SET deleted_on = ?1 WHERE id = ?2 AND deleted_on = 0",
                    params![now(), id],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Purges soft-deleted articles. Failures are logged, never reported.
    pub async fn clean(&self) -> bool {
        let result = self
            .conn
            .call(|conn| Ok(conn.execute("DELETE FROM blog_article WHERE deleted_on != 0", [])?))
            .await;

        match result {
            Ok(purged) => tracing::info!(purged, "Cleaned deleted articles"),
            Err(e) => tracing::warn!("Failed to clean deleted articles: {}", e),
        }
        true
    }
}

fn filter_conditions(filter: ArticleFilter) -> Vec<Column> {
    let mut conditions: Vec<Column> = Vec::new();
    if let Some(tag_id) = filter.tag_id {
        conditions.push(("tag_id", Value::Integer(tag_id)));
    }
    if let Some(state) = filter.state {
        conditions.push(("state", Value::Integer(state.into())));
    }
    conditions
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        tag_id: row.get(1)?,
        tag: None,
        title: row.get(2)?,
        desc: row.get(3)?,
        content: row.get(4)?,
        cover_image_url: row.get(5)?,
        created_by: row.get(6)?,
        modified_by: row.get(7)?,
        state: row.get(8)?,
        created_on: row.get(9)?,
        modified_on: row.get(10)?,
        deleted_on: row.get(11)?,
    })
}
