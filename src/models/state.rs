use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Publication state shared by tags and articles. Serialized as 0 / 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum State {
    #[default]
    Draft,
    Published,
}

impl From<State> for i64 {
    fn from(state: State) -> Self {
        match state {
            State::Draft => 0,
            State::Published => 1,
        }
    }
}

impl TryFrom<i64> for State {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(State::Draft),
            1 => Ok(State::Published),
            other => Err(AppError::validation(format!(
                "state must be 0 or 1, got {other}"
            ))),
        }
    }
}

impl ToSql for State {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(*self)))
    }
}

impl FromSql for State {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        State::try_from(raw).map_err(|_| FromSqlError::OutOfRange(raw))
    }
}
