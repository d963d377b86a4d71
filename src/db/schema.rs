pub const SCHEMA: &str = r#"
-- tags table
CREATE TABLE IF NOT EXISTS blog_tag (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL DEFAULT '',
    created_on INTEGER NOT NULL DEFAULT 0,
    created_by TEXT NOT NULL DEFAULT '',
    modified_on INTEGER NOT NULL DEFAULT 0,
    modified_by TEXT NOT NULL DEFAULT '',
    deleted_on INTEGER NOT NULL DEFAULT 0,
    state INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_blog_tag_name ON blog_tag(name);
CREATE INDEX IF NOT EXISTS idx_blog_tag_deleted_on ON blog_tag(deleted_on);

-- articles table (tag_id is checked by callers, not constrained here)
CREATE TABLE IF NOT EXISTS blog_article (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag_id INTEGER NOT NULL DEFAULT 0,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    cover_image_url TEXT NOT NULL DEFAULT '',
    created_on INTEGER NOT NULL DEFAULT 0,
    created_by TEXT NOT NULL DEFAULT '',
    modified_on INTEGER NOT NULL DEFAULT 0,
    modified_by TEXT NOT NULL DEFAULT '',
    deleted_on INTEGER NOT NULL DEFAULT 0,
    state INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_blog_article_tag_id ON blog_article(tag_id);
CREATE INDEX IF NOT EXISTS idx_blog_article_deleted_on ON blog_article(deleted_on);
"#;
