use crate::helpers::{assert_json_response, count_blocks};
use crate::test_app::spawn_app;
use uuid::Uuid;

#[tokio::test]
async fn delete_returns_204_and_removes_the_post() {
    // Arrange
    let app = spawn_app().await;
    let blog_id = app
        .create_blog_returning_id(&serde_json::json!({ "title": "doomed", "content": "x" }))
        .await;

    // Act
    let response = app.delete_blog(blog_id).await;

    // Assert
    assert_eq!(response.status().as_u16(), 204);
    assert!(response.text().await.unwrap().is_empty());

    let get_response = app.get_blog(blog_id).await;
    assert_eq!(get_response.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_cascades_to_content_blocks() {
    // Arrange
    let app = spawn_app().await;
    let blog_id = app
        .create_blog_returning_id(&serde_json::json!({
            "title": "doomed",
            "blocks": [
                { "type": "richtext", "content": "a" },
                { "type": "html", "content": "<p>b</p>" }
            ]
        }))
        .await;
    assert_eq!(count_blocks(&app.db_connection_pool, blog_id).await, 2);

    // Act
    let response = app.delete_blog(blog_id).await;

    // Assert - no orphaned blocks remain
    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(count_blocks(&app.db_connection_pool, blog_id).await, 0);
}

#[tokio::test]
async fn delete_nonexistent_post_returns_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.delete_blog(Uuid::new_v4()).await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let error_body: serde_json::Value = assert_json_response(response).await;
    assert_eq!(error_body["error"].as_str().unwrap(), "Not found");
}
