use std::net::TcpListener;
use std::time::Duration;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{Json, Response};
use axum::routing::{get, post};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::configuration::{DatabaseSettings, Settings};
use crate::routes::{
    ApiDoc, create_blog, delete_blog, get_blog, health_check, like_blog, list_blogs, list_tags,
    post_comment, read_blog, update_blog,
};

const MAX_CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// API request bodies are capped at 5 MB.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

/// Establish the storage connection at startup, retrying up to
/// [`MAX_CONNECT_ATTEMPTS`] times with a fixed delay and logging each failed
/// attempt with its ordinal. The final failure propagates to the caller -
/// there is no partial startup, and mid-life connection loss is not handled
/// here.
pub async fn connect_with_retry(
    db_configuration: &DatabaseSettings,
) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        match PgPoolOptions::new()
            .connect_with(db_configuration.connect_options())
            .await
        {
            Ok(connection_pool) => {
                tracing::info!("Database connection established");
                return Ok(connection_pool);
            }
            Err(error) => {
                tracing::warn!(
                    "Database connect attempt {}/{} failed: {}",
                    attempt,
                    MAX_CONNECT_ATTEMPTS,
                    error
                );
                if attempt == MAX_CONNECT_ATTEMPTS {
                    return Err(error);
                }
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    connection_pool: PgPool,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = connect_with_retry(&configuration.database).await?;
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            connection_pool,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        let app_state = AppState {
            db: self.connection_pool,
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .route("/health", get(health_check))
            .route("/api-docs/openapi.json", get(openapi_json))
            .nest(
                "/api/blogs",
                Router::new()
                    .route("/", get(list_blogs).post(create_blog))
                    .route("/tags", get(list_tags))
                    .route("/{id}/like", post(like_blog))
                    .route("/{id}/read", post(read_blog))
                    .route("/{id}/comments", post(post_comment))
                    .route(
                        "/{id}",
                        get(get_blog).put(update_blog).delete(delete_blog),
                    )
                    .route_layer(axum::middleware::from_fn(no_store_headers)),
            )
            .with_state(app_state)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(cors)
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::from_std(self.listener)?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// API responses must always be fresh: disable HTTP caching on every /api
// route.
async fn no_store_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}
