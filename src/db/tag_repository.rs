use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{NewTag, Tag, TagFilter, TagPatch};

use super::{active_where, now, page_bounds, update_statement, Column};

pub(super) const TAG_COLUMNS: &str =
    "id, name, created_by, modified_by, state, created_on, modified_on, deleted_on";

#[derive(Clone)]
pub struct TagRepository {
    conn: Connection,
}

impl TagRepository {
    pub(super) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub async fn exists_by_id(&self, id: i64) -> Result<bool> {
        let exists = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM blog_tag WHERE id = ?1 AND deleted_on = 0",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM blog_tag WHERE name = ?1 AND deleted_on = 0",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }

    /// Id of the active tag holding `name`, if any.
    pub async fn find_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        let name = name.to_string();
        let id = self
            .conn
            .call(move |conn| {
                let id: Option<i64> = conn
                    .query_row(
                        "SELECT id FROM blog_tag WHERE name = ?1 AND deleted_on = 0 ORDER BY id LIMIT 1",
                        params![name],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    #[cfg(test)]
    pub async fn get(&self, id: i64) -> Result<Option<Tag>> {
        let tag = self
            .conn
            .call(move |conn| {
                let tag = conn
                    .query_row(
                        &format!("SELECT {TAG_COLUMNS} FROM blog_tag WHERE id = ?1 AND deleted_on = 0"),
                        params![id],
                        tag_from_row,
                    )
                    .optional()?;
                Ok(tag)
            })
            .await?;
        Ok(tag)
    }

    pub async fn list(&self, page_num: u32, page_size: u32, filter: TagFilter) -> Result<Vec<Tag>> {
        let conditions = filter_conditions(filter);
        let tags = self
            .conn
            .call(move |conn| {
                let sql = format!(
                    "SELECT {TAG_COLUMNS} FROM blog_tag{} ORDER BY id LIMIT ? OFFSET ?",
                    active_where(&conditions)
                );
                let values = conditions
                    .into_iter()
                    .map(|(_, value)| value)
                    .chain(page_bounds(page_num, page_size));

                let mut stmt = conn.prepare(&sql)?;
                let tags = stmt
                    .query_map(params_from_iter(values), tag_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(tags)
            })
            .await?;
        Ok(tags)
    }

    pub async fn count(&self, filter: TagFilter) -> Result<i64> {
        let conditions = filter_conditions(filter);
        let count = self
            .conn
            .call(move |conn| {
                let sql = format!("SELECT COUNT(*) FROM blog_tag{}", active_where(&conditions));
                let values = conditions.into_iter().map(|(_, value)| value);
                let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    pub async fn add(&self, tag: NewTag) -> Result<i64> {
        tag.validate()?;
        tracing::debug!(name = %tag.name, "Adding tag");

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO blog_tag (name, state, created_by, created_on) VALUES (?1, ?2, ?3, ?4)",
                    params![tag.name, tag.state, tag.created_by, now()],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// Applies the supplied fields to the active tag `id`. Unknown ids are a no-op.
    pub async fn edit(&self, id: i64, patch: TagPatch) -> Result<()> {
        patch.validate()?;

        let mut assignments: Vec<Column> = Vec::new();
        if let Some(name) = patch.name {
            assignments.push(("name", Value::Text(name)));
        }
        if let Some(state) = patch.state {
            assignments.push(("state", Value::Integer(state.into())));
        }
        if let Some(modified_by) = patch.modified_by {
            assignments.push(("modified_by", Value::Text(modified_by)));
        }
        let (sql, values) = update_statement("blog_tag", id, assignments);

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
                    "UPDATE blog_tag SET deleted_on = ?1 WHERE id = ?2 AND deleted_on = 0",
                    params![now(), id],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Purges soft-deleted tags. Failures are logged, never reported.
    pub async fn clean(&self) -> bool {
        let result = self
            .conn
            .call(|conn| Ok(conn.execute("DELETE FROM blog_tag WHERE deleted_on != 0", [])?))
            .await;

        match result {
            Ok(purged) => tracing::info!(purged, "Cleaned deleted tags"),
            Err(e) => tracing::warn!("Failed to clean deleted tags: {}", e),
        }
        true
    }
}

fn filter_conditions(filter: TagFilter) -> Vec<Column> {
    let mut conditions: Vec<Column> = Vec::new();
    if let Some(name) = filter.name {
        conditions.push(("name", Value::Text(name)));
    }
    if let Some(state) = filter.state {
        conditions.push(("state", Value::Integer(state.into())));
    }
    conditions
}

pub(super) fn tag_from_row(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        created_by: row.get(2)?,
        modified_by: row.get(3)?,
        state: row.get(4)?,
        created_on: row.get(5)?,
        modified_on: row.get(6)?,
        deleted_on: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::AppError;
    use crate::models::State;

    async fn repo() -> TagRepository {
        Database::open_in_memory().await.unwrap().tags()
    }

    fn new_tag(name: &str, state: State) -> NewTag {
        NewTag {
            name: name.to_string(),
            state,
            created_by: "bob".to_string(),
        }
    }

    #[tokio::test]
    async fn added_tag_exists_by_name_with_its_state() {
        let tags = repo().await;

        let id = tags.add(new_tag("x", State::Published)).await.unwrap();

        assert!(tags.exists_by_name("x").await.unwrap());
        assert!(tags.exists_by_id(id).await.unwrap());
        assert_eq!(tags.find_id_by_name("x").await.unwrap(), Some(id));
        let tag = tags.get(id).await.unwrap().unwrap();
        assert_eq!(tag.state, State::Published);
        assert_eq!(tag.created_by, "bob");
        assert!(tag.created_on > 0);
        assert_eq!(tag.modified_on, 0);
    }

    #[tokio::test]
    async fn missing_tag_is_false_not_error() {
        let tags = repo().await;

        assert!(!tags.exists_by_id(42).await.unwrap());
        assert!(!tags.exists_by_name("nope").await.unwrap());
        assert_eq!(tags.find_id_by_name("nope").await.unwrap(), None);
        assert!(tags.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_tag_is_rejected_without_insert() {
        let tags = repo().await;

        let err = tags.add(new_tag("", State::Draft)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(tags.count(TagFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn edit_changes_only_supplied_fields() {
        let tags = repo().await;
        let id = tags.add(new_tag("go", State::Published)).await.unwrap();
        let before = tags.get(id).await.unwrap().unwrap();

        tags.edit(
            id,
            TagPatch {
                state: Some(State::Draft),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = tags.get(id).await.unwrap().unwrap();
        assert_eq!(after.state, State::Draft);
        assert!(after.modified_on > 0);
        assert_eq!(after.name, before.name);
        assert_eq!(after.created_by, before.created_by);
        assert_eq!(after.modified_by, before.modified_by);
        assert_eq!(after.created_on, before.created_on);
        assert_eq!(after.deleted_on, 0);
    }

    #[tokio::test]
    async fn edit_of_unknown_id_is_a_no_op() {
        let tags = repo().await;

        tags.edit(
            99,
            TagPatch {
                name: Some("ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(tags.count(TagFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn soft_deleted_tags_are_hidden_then_purged() {
        let tags = repo().await;
        let keep = tags.add(new_tag("keep", State::Published)).await.unwrap();
        let gone = tags.add(new_tag("gone", State::Published)).await.unwrap();

        tags.delete(gone).await.unwrap();
        tags.delete(gone).await.unwrap();

        let listed = tags.list(0, 10, TagFilter::default()).await.unwrap();
        assert_eq!(listed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![keep]);
        assert_eq!(tags.count(TagFilter::default()).await.unwrap(), 1);
        assert!(!tags.exists_by_id(gone).await.unwrap());
        assert!(!tags.exists_by_name("gone").await.unwrap());

        assert!(tags.clean().await);
        assert!(!tags.exists_by_id(gone).await.unwrap());
        let remaining: i64 = tags
            .conn
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM blog_tag", [], |row| row.get::<_, i64>(0))?))
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn list_applies_filters_and_pages() {
        let tags = repo().await;
        for i in 0..7 {
            let state = if i % 2 == 0 { State::Published } else { State::Draft };
            tags.add(new_tag(&format!("t{i}"), state)).await.unwrap();
        }

        let published = TagFilter {
            state: Some(State::Published),
            ..Default::default()
        };
        assert_eq!(tags.count(published.clone()).await.unwrap(), 4);
        assert_eq!(tags.list(0, 3, published.clone()).await.unwrap().len(), 3);
        assert_eq!(tags.list(1, 3, published).await.unwrap().len(), 1);

        let by_name = TagFilter {
            name: Some("t3".to_string()),
            state: Some(State::Draft),
        };
        let found = tags.list(0, 10, by_name).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "t3");
    }
}
