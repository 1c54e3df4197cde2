pub mod queries;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Block, BlockKind, BlogPost, BlogPostUpdate, Comment, NewBlogPost, NewComment};
use crate::routes::error::{ApiError, ErrorResponse};
use crate::startup::AppState;

/// One submitted content block. Unknown `type` values coerce to "richtext",
/// a missing `content` to the empty string.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct BlockPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
}

impl From<BlockPayload> for Block {
    fn from(payload: BlockPayload) -> Self {
        Block {
            kind: payload
                .kind
                .as_deref()
                .map(BlockKind::coerce)
                .unwrap_or(BlockKind::Richtext),
            content: payload.content.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub blocks: Option<Vec<BlockPayload>>,
}

impl TryFrom<CreateBlogRequest> for NewBlogPost {
    type Error = String;

    fn try_from(request: CreateBlogRequest) -> Result<Self, Self::Error> {
        let title = request
            .title
            .filter(|title| !title.is_empty())
            .ok_or_else(|| "title is required".to_string())?;
        let blocks: Vec<Block> = request
            .blocks
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        // Blocks and flat content are mutually exclusive body representations:
        // submitted blocks force the flat content empty, otherwise a non-empty
        // flat content is required.
        let content = if blocks.is_empty() {
            match request.content {
                Some(content) if !content.is_empty() => content,
                _ => return Err("content or blocks are required".to_string()),
            }
        } else {
            String::new()
        };
        Ok(NewBlogPost {
            title,
            summary: request.summary.unwrap_or_default(),
            content,
            cover_image: request.cover_image,
            tags: request.tags.unwrap_or_default(),
            blocks,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub blocks: Option<Vec<BlockPayload>>,
}

impl From<UpdateBlogRequest> for BlogPostUpdate {
    fn from(request: UpdateBlogRequest) -> Self {
        let blocks: Vec<Block> = request
            .blocks
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();
        // A non-empty block list forces the flat content empty; otherwise a
        // provided content is applied as-is, without the creation-time
        // exclusive-or rule.
        let content = if blocks.is_empty() {
            request.content
        } else {
            Some(String::new())
        };
        BlogPostUpdate {
            title: request.title,
            summary: request.summary,
            content,
            cover_image: request.cover_image,
            tags: request.tags,
            blocks,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CommentRequest {
    pub name: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListBlogsParams {
    pub search: Option<String>,
    pub tag: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    /// Unique identifier for the blog post
    pub id: Uuid,
    /// Post title
    pub title: String,
    /// Short teaser shown in listings
    pub summary: String,
    /// Flat post body; empty when the post uses content blocks
    pub content: String,
    /// Cover image URI, omitted when never set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Tags in insertion order, duplicates preserved
    pub tags: Vec<String>,
    /// Like counter
    pub likes: i64,
    /// Read counter
    pub read_count: i64,
    /// Reader comments in append order
    pub comments: Vec<Comment>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Ordered content blocks; present only where the operation exposes them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
}

impl BlogPostResponse {
    fn from_post(post: BlogPost, blocks: Option<Vec<Block>>) -> Self {
        BlogPostResponse {
            id: post.id,
            title: post.title,
            summary: post.summary,
            content: post.content,
            cover_image: post.cover_image,
            tags: post.tags,
            likes: post.likes,
            read_count: post.read_count,
            comments: post.comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
            blocks,
        }
    }
}

impl From<BlogPost> for BlogPostResponse {
    fn from(post: BlogPost) -> Self {
        Self::from_post(post, None)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikesResponse {
    /// Like counter after the increment
    pub likes: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadCountResponse {
    /// Read counter after the increment
    pub read_count: i64,
}

/// List blog posts
///
/// Returns all posts, newest first, without content blocks. An optional
/// `search` term restricts to posts whose title or summary contains it as a
/// case-insensitive literal substring; an optional `tag` restricts to posts
/// carrying exactly that tag.
#[utoipa::path(
    get,
    path = "/api/blogs",
    tag = "blogs",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive substring matched against title and summary"),
        ("tag" = Option<String>, Query, description = "Exact tag to filter by"),
    ),
    responses(
        (status = 200, description = "Matching blog posts, newest first", body = Vec<BlogPostResponse>),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "List blog posts", skip(state))]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(params): Query<ListBlogsParams>,
) -> Result<Json<Vec<BlogPostResponse>>, ApiError> {
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());
    let tag = params
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|tag| !tag.is_empty());
    let posts = queries::list_posts(&state.db, search, tag).await?;
    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// List distinct tags
///
/// Returns every distinct non-empty tag value across all posts, sorted
/// ascending.
#[utoipa::path(
    get,
    path = "/api/blogs/tags",
    tag = "blogs",
    responses(
        (status = 200, description = "Sorted distinct tags", body = Vec<String>),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "List distinct tags", skip(state))]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let tags = queries::distinct_tags(&state.db).await?;
    Ok(Json(tags))
}

/// Like a blog post
///
/// Increments the like counter and returns the post-increment value. Repeated
/// calls all count.
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/like",
    tag = "blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post unique identifier")
    ),
    responses(
        (status = 200, description = "New like count", body = LikesResponse),
        (status = 404, description = "Blog post not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Like blog post", skip(state))]
pub async fn like_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
) -> Result<Json<LikesResponse>, ApiError> {
    let likes = queries::increment_likes(&state.db, blog_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(LikesResponse { likes }))
}

/// Mark a blog post as read
///
/// Increments the read counter and returns the post-increment value.
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/read",
    tag = "blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post unique identifier")
    ),
    responses(
        (status = 200, description = "New read count", body = ReadCountResponse),
        (status = 404, description = "Blog post not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Mark blog post as read", skip(state))]
pub async fn read_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
) -> Result<Json<ReadCountResponse>, ApiError> {
    let read_count = queries::increment_read_count(&state.db, blog_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(ReadCountResponse { read_count }))
}

/// Append a comment to a blog post
///
/// The comment text is required; a blank or absent name defaults to
/// "Anonymous". Comments are append-only.
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/comments",
    tag = "blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post unique identifier")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "The appended comment", body = Comment),
        (status = 400, description = "Missing comment text", body = ErrorResponse),
        (status = 404, description = "Blog post not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Append comment to blog post", skip(state, request))]
pub async fn post_comment(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validation happens before any storage round-trip.
    let new_comment =
        NewComment::parse(request.name, request.text).map_err(ApiError::InvalidInput)?;
    let comment = Comment::new(new_comment);
    let found = queries::append_comment(&state.db, blog_id, &comment).await?;
    if !found {
        return Err(ApiError::NotFound);
    }
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Get a single blog post
///
/// Returns the post together with its ordered content blocks (an empty array
/// when the post has none).
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    tag = "blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post unique identifier")
    ),
    responses(
        (status = 200, description = "Blog post with its blocks", body = BlogPostResponse),
        (status = 404, description = "Blog post not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Get blog post", skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
) -> Result<Json<BlogPostResponse>, ApiError> {
    let post = queries::get_post(&state.db, blog_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let blocks = queries::get_blocks(&state.db, blog_id).await?;
    Ok(Json(BlogPostResponse::from_post(post, Some(blocks))))
}

/// Create a blog post
///
/// The title is required. The body is either a non-empty flat `content` or a
/// non-empty `blocks` sequence; submitted blocks force the flat content
/// empty. The response echoes the submitted blocks rather than re-reading
/// them from storage.
#[utoipa::path(
    post,
    path = "/api/blogs",
    tag = "blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "The created blog post", body = BlogPostResponse),
        (status = 400, description = "Missing title, or neither content nor blocks", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Create blog post", skip(state, request))]
pub async fn create_blog(
    State(state): State<AppState>,
    Json(request): Json<CreateBlogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_post: NewBlogPost = request.try_into().map_err(ApiError::InvalidInput)?;
    let submitted_blocks = (!new_post.blocks.is_empty()).then(|| new_post.blocks.clone());
    let post = queries::insert_post(&state.db, &new_post).await?;
    Ok((
        StatusCode::CREATED,
        Json(BlogPostResponse::from_post(post, submitted_blocks)),
    ))
}

/// Update a blog post
///
/// Applies only the fields present in the request. A non-empty `blocks`
/// sequence replaces the post's whole block set and forces the flat content
/// empty; in that case the response carries the re-read, persisted sequence.
#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    tag = "blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post unique identifier")
    ),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "The updated blog post", body = BlogPostResponse),
        (status = 404, description = "Blog post not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Update blog post", skip(state, request))]
pub async fn update_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
    Json(request): Json<UpdateBlogRequest>,
) -> Result<Json<BlogPostResponse>, ApiError> {
    let update: BlogPostUpdate = request.into();
    let (post, blocks) = queries::update_post(&state.db, blog_id, &update)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(BlogPostResponse::from_post(post, blocks)))
}

/// Delete a blog post
///
/// Removes the post and all content blocks referencing it.
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    tag = "blogs",
    params(
        ("id" = Uuid, Path, description = "Blog post unique identifier")
    ),
    responses(
        (status = 204, description = "Blog post and its blocks deleted"),
        (status = 404, description = "Blog post not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
#[tracing::instrument(name = "Delete blog post", skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(blog_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = queries::delete_post(&state.db, blog_id).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
