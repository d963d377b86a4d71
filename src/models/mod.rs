mod article;
mod state;
mod tag;

pub use article::{Article, ArticleFilter, ArticlePatch, NewArticle};
pub use state::State;
pub use tag::{NewTag, Tag, TagFilter, TagPatch};

use crate::error::{AppError, Result};

/// Cap on `created_by` / `modified_by` for both entities.
pub(crate) const AUTHOR_MAX: usize = 100;

pub(crate) fn require_text(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    limit_text(field, Some(value), max)
}

pub(crate) fn limit_text(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn require_id(field: &str, id: i64) -> Result<()> {
    if id < 1 {
        return Err(AppError::validation(format!("{field} must be greater than 0")));
    }
    Ok(())
}
