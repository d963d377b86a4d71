use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{limit_text, require_id, require_text, State, Tag, AUTHOR_MAX};

const TITLE_MAX: usize = 100;
const DESC_MAX: usize = 255;
const CONTENT_MAX: usize = 65535;
const COVER_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub tag_id: i64,
    /// Resolved at read time; `None` once the referenced tag is gone.
    pub tag: Option<Tag>,
    pub title: String,
    pub desc: String,
    pub content: String,
    pub cover_image_url: String,
    pub created_by: String,
    pub modified_by: String,
    pub state: State,
    pub created_on: i64,
    pub modified_on: i64,
    pub deleted_on: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub tag_id: i64,
    pub title: String,
    pub desc: String,
    pub content: String,
    pub cover_image_url: String,
    pub created_by: String,
    #[serde(default)]
    pub state: State,
}

impl NewArticle {
    pub fn validate(&self) -> Result<()> {
        require_id("tag_id", self.tag_id)?;
        require_text("title", &self.title, TITLE_MAX)?;
        require_text("desc", &self.desc, DESC_MAX)?;
        require_text("content", &self.content, CONTENT_MAX)?;
        require_text("cover_image_url", &self.cover_image_url, COVER_MAX)?;
        require_text("created_by", &self.created_by, AUTHOR_MAX)
    }
}

/// Fields an article edit may touch. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
    pub tag_id: Option<i64>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub state: Option<State>,
    pub modified_by: Option<String>,
}

impl ArticlePatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(tag_id) = self.tag_id {
            require_id("tag_id", tag_id)?;
        }
        let supplied = [
            ("title", &self.title, TITLE_MAX),
            ("desc", &self.desc, DESC_MAX),
            ("content", &self.content, CONTENT_MAX),
            ("cover_image_url", &self.cover_image_url, COVER_MAX),
        ];
        for (field, value, max) in supplied {
            if let Some(value) = value {
                require_text(field, value, max)?;
            }
        }
        limit_text("modified_by", self.modified_by.as_deref(), AUTHOR_MAX)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleFilter {
    pub tag_id: Option<i64>,
    pub state: Option<State>,
}
