use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon: Option<String>,
    pub tags: Vec<Tag>,
}

/// One row of the flat bookmark/tag join. Tag columns are NULL for a
/// bookmark without tags.
#[derive(sqlx::FromRow, Clone)]
pub struct DbBookmarkRow {
    pub id: Option<i64>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon: Option<String>,
    pub tag_id: Option<i64>,
    pub tag_name: Option<String>,
}

/// Folds flat join rows into bookmarks with nested tag lists, keyed by
/// bookmark id and preserving first-seen row order.
pub fn fold_bookmark_rows(rows: &[DbBookmarkRow]) -> Vec<Bookmark> {
    let mut bookmarks: Vec<Bookmark> = Vec::new();
    let mut index_by_id: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let id = row.id.unwrap_or_default();
        let slot = *index_by_id.entry(id).or_insert_with(|| {
            bookmarks.push(Bookmark {
                id,
                url: row.url.clone().unwrap_or_default(),
                title: row.title.clone(),
                description: row.description.clone(),
                favicon: row.favicon.clone(),
                tags: Vec::new(),
            });
            bookmarks.len() - 1
        });

        if let (Some(tag_id), Some(tag_name)) = (row.tag_id, row.tag_name.clone()) {
            let tags = &mut bookmarks[slot].tags;
            if !tags.iter().any(|t| t.id == tag_id) {
                tags.push(Tag {
                    id: tag_id,
                    name: tag_name,
                });
            }
        }
    }

    bookmarks
}
