use crate::helpers::assert_json_response;
use crate::test_app::spawn_app;

#[tokio::test]
async fn listing_returns_all_posts_newest_first() {
    // Arrange
    let app = spawn_app().await;
    let first = app
        .create_blog_returning_id(&serde_json::json!({ "title": "first", "content": "a" }))
        .await;
    let second = app
        .create_blog_returning_id(&serde_json::json!({ "title": "second", "content": "b" }))
        .await;

    // Act
    let posts: Vec<serde_json::Value> = assert_json_response(app.get_blogs(&[]).await).await;

    // Assert
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["id"].as_str().unwrap(), second.to_string());
    assert_eq!(posts[1]["id"].as_str().unwrap(), first.to_string());
}

#[tokio::test]
async fn listing_does_not_include_blocks() {
    // Arrange
    let app = spawn_app().await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "blocky",
        "blocks": [{ "type": "richtext", "content": "x" }]
    }))
    .await;

    // Act
    let posts: Vec<serde_json::Value> = assert_json_response(app.get_blogs(&[]).await).await;

    // Assert
    assert_eq!(posts.len(), 1);
    assert!(posts[0].get("blocks").is_none());
}

#[tokio::test]
async fn search_matches_title_or_summary_case_insensitively() {
    // Arrange
    let app = spawn_app().await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "Rust in Anger",
        "content": "a"
    }))
    .await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "Something else",
        "summary": "all about rust tooling",
        "content": "b"
    }))
    .await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "Gardening",
        "content": "c"
    }))
    .await;

    // Act
    let posts: Vec<serde_json::Value> =
        assert_json_response(app.get_blogs(&[("search", "RUST")]).await).await;

    // Assert - matched in title for one post, in summary for the other
    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn search_term_is_matched_literally_not_as_a_pattern() {
    // Arrange
    let app = spawn_app().await;
    app.create_blog_returning_id(&serde_json::json!({ "title": "a.c", "content": "x" }))
        .await;
    app.create_blog_returning_id(&serde_json::json!({ "title": "abc", "content": "y" }))
        .await;

    // Act - "." must only match a literal dot, never "any character"
    let posts: Vec<serde_json::Value> =
        assert_json_response(app.get_blogs(&[("search", ".")]).await).await;

    // Assert
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"].as_str().unwrap(), "a.c");

    // A percent sign is a literal character too
    app.create_blog_returning_id(&serde_json::json!({ "title": "100% organic", "content": "z" }))
        .await;
    let posts: Vec<serde_json::Value> =
        assert_json_response(app.get_blogs(&[("search", "100%")]).await).await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"].as_str().unwrap(), "100% organic");
}

#[tokio::test]
async fn blank_search_is_ignored() {
    // Arrange
    let app = spawn_app().await;
    app.create_blog_returning_id(&serde_json::json!({ "title": "one", "content": "a" }))
        .await;
    app.create_blog_returning_id(&serde_json::json!({ "title": "two", "content": "b" }))
        .await;

    // Act
    let posts: Vec<serde_json::Value> =
        assert_json_response(app.get_blogs(&[("search", "   ")]).await).await;

    // Assert
    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn tag_filter_requires_exact_membership() {
    // Arrange
    let app = spawn_app().await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "tagged x",
        "content": "a",
        "tags": ["x"]
    }))
    .await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "tagged xy",
        "content": "b",
        "tags": ["xy"]
    }))
    .await;

    // Act
    let posts: Vec<serde_json::Value> =
        assert_json_response(app.get_blogs(&[("tag", "x")]).await).await;

    // Assert - "xy" does not contain the tag "x"
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"].as_str().unwrap(), "tagged x");
}

#[tokio::test]
async fn search_and_tag_filters_combine_with_and() {
    // Arrange
    let app = spawn_app().await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "rust post",
        "content": "a",
        "tags": ["x"]
    }))
    .await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "rust post without the tag",
        "content": "b"
    }))
    .await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "tagged but no match",
        "content": "c",
        "tags": ["x"]
    }))
    .await;

    // Act
    let posts: Vec<serde_json::Value> =
        assert_json_response(app.get_blogs(&[("search", "rust"), ("tag", "x")]).await).await;

    // Assert
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"].as_str().unwrap(), "rust post");
}

#[tokio::test]
async fn tags_endpoint_returns_sorted_distinct_non_empty_tags() {
    // Arrange
    let app = spawn_app().await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "one",
        "content": "a",
        "tags": ["b", "a"]
    }))
    .await;
    app.create_blog_returning_id(&serde_json::json!({
        "title": "two",
        "content": "b",
        "tags": ["a", ""]
    }))
    .await;

    // Act
    let tags: Vec<String> = assert_json_response(app.get_tags().await).await;

    // Assert - distinct, lexicographically ascending, empty values dropped
    assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn api_responses_disable_http_caching() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get_blogs(&[]).await;

    // Assert
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|value| value.to_str().ok()),
        Some("no-store, no-cache, must-revalidate")
    );
    assert_eq!(
        response
            .headers()
            .get("pragma")
            .and_then(|value| value.to_str().ok()),
        Some("no-cache")
    );
}
