#[cfg(test)]
pub mod test_utils {
    use crate::db::{create_bookmark, create_user};
    use crate::error::AppError;
    use rocket::http::{ContentType, Cookie};
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite, sqlite::SqlitePoolOptions};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        bookmarks: Vec<TestBookmark>,
    }

    pub struct TestUser {
        pub username: String,
        pub password: String,
    }

    pub struct TestBookmark {
        pub owner_username: Option<String>,
        pub url: String,
        pub title: Option<String>,
        pub tags: Vec<String>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(mut self, username: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn user_with_password(mut self, username: &str, password: &str) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                password: password.to_string(),
            });
            self
        }

        pub fn bookmark(
            mut self,
            owner_username: Option<&str>,
            url: &str,
            title: Option<&str>,
            tags: &[&str],
        ) -> Self {
            self.bookmarks.push(TestBookmark {
                owner_username: owner_username.map(String::from),
                url: url.to_string(),
                title: title.map(String::from),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder().is_test(true).try_init();
            });

            // One connection so every statement sees the same in-memory db.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut user_id_map: HashMap<String, i64> = HashMap::new();
            let mut bookmark_id_map: HashMap<String, i64> = HashMap::new();

            for user in &self.users {
                let created = create_user(&pool, &user.username, &user.password).await?;
                user_id_map.insert(user.username.clone(), created.id);
            }

            for bookmark in &self.bookmarks {
                let owner_id = match &bookmark.owner_username {
                    Some(username) => user_id_map.get(username).copied(),
                    None => self
                        .users
                        .first()
                        .map(|u| user_id_map[&u.username]),
                };

                if let Some(owner_id) = owner_id {
                    let created = create_bookmark(
                        &pool,
                        owner_id,
                        &bookmark.url,
                        bookmark.title.as_deref(),
                        None,
                        None,
                        &bookmark.tags,
                    )
                    .await?;

                    bookmark_id_map.insert(bookmark.url.clone(), created.id);
                }
            }

            Ok(TestDb {
                pool,
                user_id_map,
                bookmark_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub bookmark_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn user_id(&self, username: &str) -> Option<i64> {
            self.user_id_map.get(username).copied()
        }

        pub fn bookmark_id(&self, url: &str) -> Option<i64> {
            self.bookmark_id_map.get(url).copied()
        }
    }

    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .user("alice")
            .user("bob")
            .bookmark(
                Some("alice"),
                "https://example.com",
                Some("Example"),
                &["news", "tech"],
            )
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = crate::init_rocket(test_db.pool.clone()).await;
        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build test client");

        (client, test_db)
    }

    pub async fn login_test_user(
        client: &Client,
        username: &str,
        password: &str,
    ) -> Vec<Cookie<'static>> {
        let response = client
            .post("/login")
            .header(ContentType::Form)
            .body(format!("username={}&password={}", username, password))
            .dispatch()
            .await;

        response
            .cookies()
            .iter()
            .map(|cookie| cookie.clone().into_owned())
            .collect()
    }
}
