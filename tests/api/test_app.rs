use blog_api::configuration::get_configuration;
use blog_api::startup::Application;
use sqlx::PgPool;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::helpers::{TRACING, configure_database};

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db_connection_pool: PgPool,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn get_health(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/health", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_blogs(&self, query: &[(&str, &str)]) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api/blogs", &self.address))
            .query(query)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_tags(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api/blogs/tags", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_blog(&self, blog_id: Uuid) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api/blogs/{}", &self.address, blog_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_blog<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}/api/blogs", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_blog<Body>(&self, blog_id: Uuid, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .put(format!("{}/api/blogs/{}", &self.address, blog_id))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_blog(&self, blog_id: Uuid) -> reqwest::Response {
        self.api_client
            .delete(format!("{}/api/blogs/{}", &self.address, blog_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_like(&self, blog_id: Uuid) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/blogs/{}/like", &self.address, blog_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_read(&self, blog_id: Uuid) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/blogs/{}/read", &self.address, blog_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_comment<Body>(&self, blog_id: Uuid, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}/api/blogs/{}/comments", &self.address, blog_id))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Create a post through the API and return its id.
    pub async fn create_blog_returning_id(&self, body: &serde_json::Value) -> Uuid {
        let response = self.post_blog(body).await;
        assert_eq!(
            response.status().as_u16(),
            201,
            "Failed to create fixture blog post"
        );
        let created: serde_json::Value = response.json().await.expect("Failed to parse JSON body");
        Uuid::parse_str(created["id"].as_str().expect("id should be a string"))
            .expect("id should be a UUID")
    }
}

pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    LazyLock::force(&TRACING);

    // Randomise configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a different database for each test case
        c.database.database_name = Uuid::new_v4().to_string();
        // Use a random OS port
        c.application.port = 0;
        c
    };

    let db_connection_pool = configure_database(&configuration.database).await;

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let address = format!("http://127.0.0.1:{}", application.port());
    let port = application.port();

    #[allow(clippy::let_underscore_future)]
    let _ = tokio::spawn(application.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        port,
        db_connection_pool,
        api_client,
    }
}
