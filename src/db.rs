use chrono::{NaiveDateTime, Utc};
use sqlx::{Pool, Sqlite, Transaction};
use tracing::{info, instrument};

use crate::auth::{DbUser, DbUserSession, User, UserSession};
use crate::error::AppError;
use crate::models::{Bookmark, DbBookmarkRow, fold_bookmark_rows};

/// Flat join select shared by every bookmark read. Produces one row per
/// bookmark/tag pair, with NULL tag columns for untagged bookmarks.
const BOOKMARK_SELECT: &str = "SELECT b.id, b.url, b.title, b.description, b.favicon,
        t.id AS tag_id, t.name AS tag_name
     FROM bookmarks b
     LEFT JOIN bookmark_tags bt ON b.id = bt.bookmark_id
     LEFT JOIN tags t ON bt.tag_id = t.id";

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[instrument(skip_all, fields(username))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    info!("Creating new user");

    let existing = sqlx::query_as::<_, DbUser>("SELECT id, username FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            username
        )));
    }

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let res = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(&hashed_password)
        .execute(pool)
        .await?;

    Ok(User {
        id: res.last_insert_rowid(),
        username: username.to_string(),
    })
}

#[instrument]
pub async fn get_user(pool: &Pool<Sqlite>, id: i64) -> Result<User, AppError> {
    info!("Fetching user by ID");
    let row = sqlx::query_as::<_, DbUser>("SELECT id, username FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(user) => Ok(User::from(user)),
        _ => Err(AppError::NotFound(format!(
            "User with id {} not found in database",
            id
        ))),
    }
}

#[instrument]
pub async fn find_user_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, AppError> {
    info!("Getting user by username");
    let row = sqlx::query_as::<_, DbUser>("SELECT id, username FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(User::from))
}

/// Verifies a username/password pair. An unknown username and a wrong
/// password both come back as `None` so callers cannot tell them apart.
#[instrument(skip_all, fields(username))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    info!("Authenticating user");

    #[derive(sqlx::FromRow)]
    struct CredentialsRow {
        id: i64,
        username: String,
        password_hash: String,
    }

    let row = sqlx::query_as::<_, CredentialsRow>(
        "SELECT id, username, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => match bcrypt::verify(password, &row.password_hash) {
            Ok(true) => Ok(Some(User {
                id: row.id,
                username: row.username,
            })),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[instrument(skip(pool, token))]
pub async fn create_session(
    pool: &Pool<Sqlite>,
    user_id: i64,
    token: &str,
    expires_at: NaiveDateTime,
) -> Result<i64, AppError> {
    info!("Creating user session");

    let res = sqlx::query("INSERT INTO user_sessions (user_id, token, expires_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool, token))]
pub async fn session_by_token(
    pool: &Pool<Sqlite>,
    token: &str,
) -> Result<UserSession, AppError> {
    let session = sqlx::query_as::<_, DbUserSession>(
        "SELECT id, user_id, token, created_at, expires_at FROM user_sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match session {
        Some(session) => Ok(UserSession::from(session)),
        _ => Err(AppError::Authentication(
            "Invalid session token".to_string(),
        )),
    }
}

#[instrument(skip(pool, token))]
pub async fn delete_session(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    info!("Invalidating session");

    sqlx::query("DELETE FROM user_sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn purge_expired_sessions(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
    info!("Purging expired sessions");

    let now = Utc::now().naive_utc();

    let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Bookmarks
// ---------------------------------------------------------------------------

#[instrument]
pub async fn list_bookmarks(
    pool: &Pool<Sqlite>,
    owner_id: i64,
) -> Result<Vec<Bookmark>, AppError> {
    info!("Listing bookmarks");
    let sql = format!(
        "{} WHERE b.user_id = ? ORDER BY b.id DESC, t.id",
        BOOKMARK_SELECT
    );
    let rows = sqlx::query_as::<_, DbBookmarkRow>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

    Ok(fold_bookmark_rows(&rows))
}

/// Bookmarks owned by `owner_id` carrying a tag with exactly this name.
/// Both conditions are applied: the tag filter alone would leak other
/// users' bookmarks sharing the tag.
#[instrument]
pub async fn bookmarks_by_tag(
    pool: &Pool<Sqlite>,
    tag_name: &str,
    owner_id: i64,
) -> Result<Vec<Bookmark>, AppError> {
    info!("Listing bookmarks by tag");
    let sql = format!(
        "{} WHERE b.user_id = ?
           AND b.id IN (
               SELECT bt2.bookmark_id
               FROM bookmark_tags bt2
               JOIN tags t2 ON bt2.tag_id = t2.id
               WHERE t2.name = ?
           )
         ORDER BY b.id DESC, t.id",
        BOOKMARK_SELECT
    );
    let rows = sqlx::query_as::<_, DbBookmarkRow>(&sql)
        .bind(owner_id)
        .bind(tag_name)
        .fetch_all(pool)
        .await?;

    Ok(fold_bookmark_rows(&rows))
}

/// A single bookmark with its tags. A bookmark that exists but belongs to
/// another user is reported exactly like a missing one.
#[instrument]
pub async fn get_bookmark(
    pool: &Pool<Sqlite>,
    id: i64,
    owner_id: i64,
) -> Result<Bookmark, AppError> {
    info!("Fetching bookmark by ID");
    let sql = format!(
        "{} WHERE b.id = ? AND b.user_id = ? ORDER BY t.id",
        BOOKMARK_SELECT
    );
    let rows = sqlx::query_as::<_, DbBookmarkRow>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

    fold_bookmark_rows(&rows)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("Bookmark with id {} not found", id)))
}

#[instrument(skip(pool, tag_names))]
pub async fn create_bookmark(
    pool: &Pool<Sqlite>,
    owner_id: i64,
    url: &str,
    title: Option<&str>,
    description: Option<&str>,
    favicon: Option<&str>,
    tag_names: &[String],
) -> Result<Bookmark, AppError> {
    info!("Creating bookmark");

    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO bookmarks (url, title, description, favicon, user_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(url)
    .bind(title)
    .bind(description)
    .bind(favicon)
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    let bookmark_id = res.last_insert_rowid();

    attach_tags(&mut tx, bookmark_id, tag_names).await?;

    tx.commit().await?;

    get_bookmark(pool, bookmark_id, owner_id).await
}

/// Partial update: `None` fields are left untouched. The tag set is always
/// cleared and rebuilt from `tag_names` — passing an empty slice removes
/// every tag, it does not mean "keep the current ones".
#[instrument(skip(pool, tag_names))]
pub async fn update_bookmark(
    pool: &Pool<Sqlite>,
    id: i64,
    owner_id: i64,
    title: Option<&str>,
    url: Option<&str>,
    description: Option<&str>,
    tag_names: &[String],
) -> Result<Bookmark, AppError> {
    info!("Updating bookmark");

    let mut tx = pool.begin().await?;

    let owned = sqlx::query("SELECT id FROM bookmarks WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

    if owned.is_none() {
        return Err(AppError::NotFound(format!(
            "Bookmark with id {} not found",
            id
        )));
    }

    if let Some(title) = title {
        sqlx::query("UPDATE bookmarks SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(url) = url {
        sqlx::query("UPDATE bookmarks SET url = ? WHERE id = ?")
            .bind(url)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(description) = description {
        sqlx::query("UPDATE bookmarks SET description = ? WHERE id = ?")
            .bind(description)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM bookmark_tags WHERE bookmark_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    attach_tags(&mut tx, id, tag_names).await?;

    tx.commit().await?;

    get_bookmark(pool, id, owner_id).await
}

/// Deletes a bookmark scoped by owner. Join rows go with it via the
/// cascade on `bookmark_tags`. Returns whether a row was actually removed.
#[instrument]
pub async fn delete_bookmark(
    pool: &Pool<Sqlite>,
    id: i64,
    owner_id: i64,
) -> Result<bool, AppError> {
    info!("Deleting bookmark");

    let res = sqlx::query("DELETE FROM bookmarks WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(res.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Splits raw tag inputs on commas, trims whitespace, and drops empties.
/// Each form field may itself carry a comma-separated list.
pub fn split_tag_names(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Get-or-create on the global tag table. Tag names are shared across
/// users; the insert is idempotent.
async fn tag_id_for_name(
    tx: &mut Transaction<'_, Sqlite>,
    tag_name: &str,
) -> Result<i64, AppError> {
    sqlx::query("INSERT INTO tags (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(tag_name)
        .execute(&mut **tx)
        .await?;

    #[derive(sqlx::FromRow)]
    struct IdRow {
        id: i64,
    }

    let row = sqlx::query_as::<_, IdRow>("SELECT id FROM tags WHERE name = ?")
        .bind(tag_name)
        .fetch_one(&mut **tx)
        .await?;

    Ok(row.id)
}

async fn attach_tags(
    tx: &mut Transaction<'_, Sqlite>,
    bookmark_id: i64,
    tag_names: &[String],
) -> Result<(), AppError> {
    for tag_name in split_tag_names(tag_names) {
        let tag_id = tag_id_for_name(tx, &tag_name).await?;

        sqlx::query("INSERT OR IGNORE INTO bookmark_tags (bookmark_id, tag_id) VALUES (?, ?)")
            .bind(bookmark_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
