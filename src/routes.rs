use chrono::Utc;
use rocket::State;
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::response::Redirect;
use rocket::response::content::RawHtml;
use sqlx::{Pool, Sqlite};

use crate::auth::{SESSION_TTL_HOURS, User, UserSession};
use crate::db::{authenticate_user, create_session, delete_session, list_bookmarks};
use crate::fragments;

#[get("/")]
pub async fn index(user: User, db: &State<Pool<Sqlite>>) -> Result<RawHtml<String>, Status> {
    let bookmarks = list_bookmarks(db, user.id).await?;

    Ok(RawHtml(fragments::index_page(&user.username, &bookmarks)))
}

#[get("/", rank = 2)]
pub fn index_anonymous() -> Redirect {
    Redirect::to(uri!("/login"))
}

#[get("/login?<error>")]
pub fn login_page(error: Option<String>) -> RawHtml<String> {
    RawHtml(fragments::login_page(error.as_deref()))
}

#[derive(FromForm)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[post("/login", data = "<form>")]
pub async fn process_login(
    form: Form<LoginForm>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, Redirect> {
    info!("Login attempt: {}", &form.username);

    let user = match authenticate_user(db, &form.username, &form.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Same message for unknown username and wrong password.
            return Err(Redirect::to(
                "/login?error=Invalid%20username%20or%20password",
            ));
        }
        Err(err) => {
            err.log_and_record("process_login");
            return Err(Redirect::to("/login?error=Login%20failed"));
        }
    };

    let token = UserSession::generate_token();
    let expires_at = Utc::now() + chrono::Duration::hours(SESSION_TTL_HOURS);

    if let Err(err) = create_session(db, user.id, &token, expires_at.naive_utc()).await {
        err.log_and_record("process_login");
        return Err(Redirect::to("/login?error=Login%20failed"));
    }

    info!("Authentication successful for {}", &user.username);

    let cookie = Cookie::build(("session_token", token))
        .same_site(SameSite::Lax)
        .http_only(true)
        .max_age(rocket::time::Duration::hours(SESSION_TTL_HOURS));
    cookies.add_private(cookie);

    Ok(Redirect::to("/"))
}

#[post("/logout")]
pub async fn process_logout(cookies: &CookieJar<'_>, db: &State<Pool<Sqlite>>) -> Redirect {
    let token = cookies
        .get_private("session_token")
        .map(|cookie| cookie.value().to_string());

    if let Some(token) = token {
        let _ = delete_session(db, &token).await;
    }

    cookies.remove_private(Cookie::build("session_token"));

    Redirect::to("/login")
}
