use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{limit_text, require_text, State, AUTHOR_MAX};

const NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_by: String,
    pub modified_by: String,
    pub state: State,
    pub created_on: i64,
    pub modified_on: i64,
    pub deleted_on: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    pub name: String,
    #[serde(default)]
    pub state: State,
    pub created_by: String,
}

impl NewTag {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name, NAME_MAX)?;
        require_text("created_by", &self.created_by, AUTHOR_MAX)
    }
}

/// Fields a tag edit may touch. `None` leaves the column as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPatch {
    pub name: Option<String>,
    pub state: Option<State>,
    pub modified_by: Option<String>,
}

impl TagPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("name", name, NAME_MAX)?;
        }
        limit_text("modified_by", self.modified_by.as_deref(), AUTHOR_MAX)
    }
}

/// Equality predicates for tag listings; unset fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagFilter {
    pub name: Option<String>,
    pub state: Option<State>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn new_tag_requires_name_and_author() {
        let tag = NewTag {
            name: "  ".to_string(),
            state: State::Published,
            created_by: "bob".to_string(),
        };
        assert!(matches!(tag.validate(), Err(AppError::Validation(_))));

        let tag = NewTag {
            name: "rust".to_string(),
            state: State::Published,
            created_by: String::new(),
        };
        assert!(tag.validate().is_err());
    }

    #[test]
    fn patch_checks_only_supplied_fields() {
        assert!(TagPatch::default().validate().is_ok());

        let patch = TagPatch {
            modified_by: Some("x".repeat(101)),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
