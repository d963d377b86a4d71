mod article_repository;
mod schema;
mod tag_repository;

pub use article_repository::ArticleRepository;
pub use tag_repository::TagRepository;

use chrono::Utc;
use rusqlite::types::Value;
use tokio_rusqlite::Connection;

use crate::error::Result;

use schema::SCHEMA;

/// Handle to the backing store. Cloning shares the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    pub fn tags(&self) -> TagRepository {
        TagRepository::new(self.conn.clone())
    }

    pub fn articles(&self) -> ArticleRepository {
        ArticleRepository::new(self.conn.clone())
    }
}

/// An equality predicate or column assignment with its bound value.
pub(crate) type Column = (&'static str, Value);

pub(crate) fn now() -> i64 {
    Utc::now().timestamp()
}

/// `WHERE` clause restricted to active rows, ANDed with one `col = ?` per condition.
pub(crate) fn active_where(conditions: &[Column]) -> String {
    let mut clause = String::from(" WHERE deleted_on = 0");
    for (column, _) in conditions {
        clause.push_str(" AND ");
        clause.push_str(column);
        clause.push_str(" = ?");
    }
    clause
}

/// Builds `UPDATE <table> SET ... WHERE id = ? AND deleted_on = 0`, stamping `modified_on`.
pub(crate) fn update_statement(table: &str, id: i64, mut assignments: Vec<Column>) -> (String, Vec<Value>) {
    assignments.push(("modified_on", Value::Integer(now())));

    let set = assignments
        .iter()
        .map(|(column, _)| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {table} SET {set} WHERE id = ? AND deleted_on = 0");

    let mut values: Vec<Value> = assignments.into_iter().map(|(_, value)| value).collect();
    values.push(Value::Integer(id));
    (sql, values)
}

pub(crate) fn page_bounds(page_num: u32, page_size: u32) -> [Value; 2] {
    let limit = i64::from(page_size);
    [Value::Integer(limit), Value::Integer(i64::from(page_num) * limit)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_clause_always_filters_deleted_rows() {
        assert_eq!(active_where(&[]), " WHERE deleted_on = 0");
        let conditions = vec![
            ("state", Value::Integer(1)),
            ("name", Value::Text("go".into())),
        ];
        assert_eq!(
            active_where(&conditions),
            " WHERE deleted_on = 0 AND state = ? AND name = ?"
        );
    }

    #[test]
    fn update_statement_appends_timestamp_and_id() {
        let (sql, values) = update_statement("blog_tag", 7, vec![("state", Value::Integer(0))]);
        assert_eq!(
            sql,
            "UPDATE blog_tag SET state = ?, modified_on = ? WHERE id = ? AND deleted_on = 0"
        );
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], Value::Integer(7));
    }

    #[test]
    fn page_bounds_use_zero_based_pages() {
        assert_eq!(page_bounds(2, 10), [Value::Integer(10), Value::Integer(20)]);
    }

    #[tokio::test]
    async fn file_backed_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog.db");
        let path = path.to_string_lossy().to_string();

        let db = Database::open(&path).await.unwrap();
        db.tags()
            .add(crate::models::NewTag {
                name: "go".to_string(),
                state: crate::models::State::Published,
                created_by: "a".to_string(),
            })
            .await
            .unwrap();
        drop(db);

        let db = Database::open(&path).await.unwrap();
        assert!(db.tags().exists_by_name("go").await.unwrap());
    }
}
