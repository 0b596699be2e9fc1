use rocket::FromForm;
use rocket::State;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{Value, json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::User;
use crate::db::{
    bookmarks_by_tag, create_bookmark, delete_bookmark, get_bookmark, list_bookmarks,
    update_bookmark,
};
use crate::fragments;
use crate::metadata::{PageMetadata, fetch_page_metadata};
use crate::models::Bookmark;
use crate::validation::{ValidateExt, ValidationResponse};

#[get("/bookmarks")]
pub async fn api_list_bookmarks(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Bookmark>>, Status> {
    let bookmarks = list_bookmarks(db, user.id).await?;

    Ok(Json(bookmarks))
}

#[get("/bookmarks/by-tag/<tag_name>")]
pub async fn api_bookmarks_by_tag(
    tag_name: String,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Bookmark>>, Status> {
    let bookmarks = bookmarks_by_tag(db, &tag_name, user.id).await?;

    Ok(Json(bookmarks))
}

#[get("/bookmarks/<id>")]
pub async fn api_get_bookmark(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Bookmark>, Status> {
    let bookmark = get_bookmark(db, id, user.id).await?;

    Ok(Json(bookmark))
}

#[get("/bookmarks/<id>/edit")]
pub async fn api_edit_bookmark(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<RawHtml<String>, Status> {
    let bookmark = get_bookmark(db, id, user.id).await?;

    Ok(RawHtml(fragments::edit_form(&bookmark)))
}

/// Best-effort title/description for the create form. Requires a session
/// like every other bookmark endpoint; a missing or unreachable url simply
/// yields empty fields.
#[get("/bookmarks/fetch-metadata?<url>")]
pub async fn api_fetch_metadata(url: Option<String>, _user: User) -> Json<PageMetadata> {
    let metadata = fetch_page_metadata(url.as_deref().unwrap_or_default()).await;

    Json(metadata)
}

#[derive(FromForm, Validate)]
pub struct CreateBookmarkForm {
    #[validate(length(min = 1, message = "URL is required"))]
    url: String,
    title: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
}

#[post("/bookmarks", data = "<form>")]
pub async fn api_create_bookmark(
    form: Form<CreateBookmarkForm>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Bookmark>, Custom<Json<ValidationResponse>>> {
    let validated = form.validate_custom()?;

    let bookmark = create_bookmark(
        db,
        user.id,
        &validated.url,
        validated.title.as_deref(),
        validated.description.as_deref(),
        None,
        &validated.tags,
    )
    .await
    .validate_custom()?;

    Ok(Json(bookmark))
}

#[derive(FromForm)]
pub struct UpdateBookmarkForm {
    new_title: Option<String>,
    new_url: Option<String>,
    new_description: Option<String>,
    new_tags: Vec<String>,
}

#[post("/bookmarks/<id>/update", data = "<form>")]
pub async fn api_update_bookmark(
    id: i64,
    form: Form<UpdateBookmarkForm>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Bookmark>, Status> {
    let bookmark = update_bookmark(
        db,
        id,
        user.id,
        form.new_title.as_deref(),
        form.new_url.as_deref(),
        form.new_description.as_deref(),
        &form.new_tags,
    )
    .await?;

    Ok(Json(bookmark))
}

#[post("/bookmarks/<id>/delete")]
pub async fn api_delete_bookmark(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Value>, Status> {
    let deleted = delete_bookmark(db, id, user.id).await?;

    if !deleted {
        return Err(Status::NotFound);
    }

    Ok(Json(json!({ "ok": true })))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
