use blog_api::auth::{generate_token, TokenKind};
use blog_api::configuration::{AuthSettings, JwtSettings};
use blog_api::models::{NewUser, Role};
use blog_api::startup::run;
use blog_api::state::AppState;
use blog_api::store::{InMemoryPostStore, InMemoryRefreshTokenStore, InMemoryUserStore, UserStore};
use reqwest::Response;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub users: Arc<InMemoryUserStore>,
    pub jwt: JwtSettings,
    pub client: reqwest::Client,
}

fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let users = Arc::new(InMemoryUserStore::new());
    let jwt = JwtSettings {
        secret: "posts-test-secret-at-least-32-characters".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
        issuer: "blog_api".to_string(),
    };
    let state = AppState::new(
        users.clone(),
        Arc::new(InMemoryRefreshTokenStore::new()),
        Arc::new(InMemoryPostStore::new()),
        jwt.clone(),
        AuthSettings {
            bcrypt_cost: 4,
            secure_cookies: false,
        },
    );

    let server = run(listener, state).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        users,
        jwt,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    /// Insert a user directly and mint an access token for it
    async fn user_token(&self, username: &str, role: Role) -> (uuid::Uuid, String) {
        let user = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "unused".to_string(),
                role,
            })
            .await
            .expect("Failed to insert user");
        let token = generate_token(&user, TokenKind::Access, &self.jwt).unwrap();
        (user.id, token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", &self.address, path)
    }

    async fn create_post(&self, token: &str, title: &str) -> Value {
        let response = self
            .client
            .post(&self.url("/posts"))
            .bearer_auth(token)
            .json(&json!({"title": title, "content": "Once upon a time"}))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());
        response.json().await.unwrap()
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(&self.url(path))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

#[tokio::test]
async fn posts_status_is_public() {
    let app = spawn_app();

    let response = app.get("/posts").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"msg": "Posts is up!"}));
}

#[tokio::test]
async fn create_post_requires_authentication() {
    let app = spawn_app();

    let response = app
        .client
        .post(&app.url("/posts"))
        .json(&json!({"title": "Hello", "content": "World"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn create_post_validates_input() {
    let app = spawn_app();
    let (_, token) = app.user_token("writer", Role::User).await;

    let response = app
        .client
        .post(&app.url("/posts"))
        .bearer_auth(&token)
        .json(&json!({"title": "   "}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn created_posts_are_listed_and_fetchable() {
    let app = spawn_app();
    let (writer_id, token) = app.user_token("writer", Role::User).await;
    let (_, other_token) = app.user_token("other", Role::User).await;

    let post = app.create_post(&token, "First").await;
    app.create_post(&other_token, "Second").await;
    assert_eq!(post["author_id"], writer_id.to_string());

    let all: Value = app.get("/posts/all").await.json().await.unwrap();
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let mine: Value = app
        .get(&format!("/posts/user/{}", writer_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["title"], "First");

    let fetched = app.get(&format!("/posts/{}", post["id"].as_str().unwrap())).await;
    assert_eq!(200, fetched.status().as_u16());
    let fetched: Value = fetched.json().await.unwrap();
    assert_eq!(fetched["title"], "First");
    assert_eq!(fetched["comments"], json!([]));
}

#[tokio::test]
async fn unknown_post_returns_404() {
    let app = spawn_app();

    let response = app.get(&format!("/posts/{}", uuid::Uuid::new_v4())).await;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn only_author_or_admin_may_update_a_post() {
    let app = spawn_app();
    let (_, author) = app.user_token("author", Role::User).await;
    let (_, stranger) = app.user_token("stranger", Role::User).await;
    let (_, admin) = app.user_token("admin", Role::Admin).await;
    let post = app.create_post(&author, "Draft").await;
    let path = app.url(&format!("/posts/{}", post["id"].as_str().unwrap()));

    let test_cases = vec![
        (&stranger, 403, "Draft"),
        (&author, 200, "By author"),
        (&admin, 200, "By admin"),
    ];

    for (token, status, expected_title) in test_cases {
        let title = if status == 200 { expected_title } else { "Hijacked" };
        let response = app
            .client
            .put(&path)
            .bearer_auth(token)
            .json(&json!({"title": title}))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(status, response.status().as_u16());

        let current: Value = app.client.get(&path).send().await.unwrap().json().await.unwrap();
        assert_eq!(current["title"], expected_title);
        assert_eq!(current["content"], "Once upon a time");
    }
}

#[tokio::test]
async fn deleting_a_post_removes_it() {
    let app = spawn_app();
    let (_, author) = app.user_token("author", Role::User).await;
    let (_, stranger) = app.user_token("stranger", Role::User).await;
    let post = app.create_post(&author, "Doomed").await;
    let path = app.url(&format!("/posts/{}", post["id"].as_str().unwrap()));

    let forbidden = app.client.delete(&path).bearer_auth(&stranger).send().await.unwrap();
    assert_eq!(403, forbidden.status().as_u16());

    let deleted = app.client.delete(&path).bearer_auth(&author).send().await.unwrap();
    assert_eq!(200, deleted.status().as_u16());

    let gone = app.client.get(&path).send().await.unwrap();
    assert_eq!(404, gone.status().as_u16());
}

#[tokio::test]
async fn comments_can_be_added_and_deleted() {
    let app = spawn_app();
    let (_, author) = app.user_token("author", Role::User).await;
    let (commenter_id, commenter) = app.user_token("commenter", Role::User).await;
    let (_, stranger) = app.user_token("stranger", Role::User).await;
    let post = app.create_post(&author, "Discuss").await;
    let post_id = post["id"].as_str().unwrap().to_string();

    let response = app
        .client
        .post(&app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&commenter)
        .json(&json!({"content": "Nice post"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    let comment: Value = response.json().await.unwrap();
    assert_eq!(comment["author_id"], commenter_id.to_string());

    let fetched: Value = app.get(&format!("/posts/{}", post_id)).await.json().await.unwrap();
    assert_eq!(fetched["comments"][0]["content"], "Nice post");

    let comment_path = app.url(&format!(
        "/posts/{}/{}",
        post_id,
        comment["id"].as_str().unwrap()
    ));
    let forbidden = app.client.delete(&comment_path).bearer_auth(&stranger).send().await.unwrap();
    assert_eq!(403, forbidden.status().as_u16());

    // the post's author may moderate comments
    let deleted = app.client.delete(&comment_path).bearer_auth(&author).send().await.unwrap();
    assert_eq!(200, deleted.status().as_u16());

    let again = app.client.delete(&comment_path).bearer_auth(&author).send().await.unwrap();
    assert_eq!(404, again.status().as_u16());
}
