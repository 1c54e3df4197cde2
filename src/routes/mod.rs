pub mod blogs;
mod error;
mod health_check;

pub use blogs::*;
pub use error::{ApiError, ErrorResponse, error_chain_fmt};
pub use health_check::*;

use crate::domain::{Block, BlockKind, Comment};

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        health_check::health_check,
        blogs::list_blogs,
        blogs::list_tags,
        blogs::like_blog,
        blogs::read_blog,
        blogs::post_comment,
        blogs::get_blog,
        blogs::create_blog,
        blogs::update_blog,
        blogs::delete_blog,
    ),
    components(schemas(
        Block,
        BlockKind,
        BlockPayload,
        BlogPostResponse,
        Comment,
        CommentRequest,
        CreateBlogRequest,
        ErrorResponse,
        HealthResponse,
        LikesResponse,
        ReadCountResponse,
        UpdateBlogRequest,
    )),
    tags(
        (name = "blogs", description = "Blog post management endpoints"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
