use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::{Block, BlockKind, BlogPost, BlogPostUpdate, Comment, NewBlogPost};

const POST_COLUMNS: &str =
    "id, title, summary, content, cover_image, tags, likes, read_count, comments, created_at, updated_at";

fn post_from_row(row: &PgRow) -> Result<BlogPost, sqlx::Error> {
    let Json(comments): Json<Vec<Comment>> = row.try_get("comments")?;
    Ok(BlogPost {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        content: row.try_get("content")?,
        cover_image: row.try_get("cover_image")?,
        tags: row.try_get("tags")?,
        likes: row.try_get("likes")?,
        read_count: row.try_get("read_count")?,
        comments,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn block_from_row(row: &PgRow) -> Result<Block, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    Ok(Block {
        kind: BlockKind::coerce(&kind),
        content: row.try_get("content")?,
    })
}

/// Both filters are literal comparisons: the search term is matched with
/// `strpos` against the lowercased title and summary, never interpreted as a
/// pattern.
#[tracing::instrument(name = "Fetch blog posts from database", skip(pool))]
pub async fn list_posts(
    pool: &PgPool,
    search: Option<&str>,
    tag: Option<&str>,
) -> Result<Vec<BlogPost>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM blog_posts
        WHERE ($1::text IS NULL
               OR strpos(lower(title), lower($1)) > 0
               OR strpos(lower(summary), lower($1)) > 0)
          AND ($2::text IS NULL OR $2 = ANY(tags))
        ORDER BY created_at DESC
        "#
    );
    sqlx::query(&query)
        .bind(search)
        .bind(tag)
        .fetch_all(pool)
        .await?
        .iter()
        .map(post_from_row)
        .collect()
}

#[tracing::instrument(name = "Fetch distinct tags from database", skip(pool))]
pub async fn distinct_tags(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT t.tag
        FROM blog_posts, unnest(tags) AS t(tag)
        WHERE t.tag IS NOT NULL AND t.tag <> ''
        ORDER BY t.tag ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    rows.iter().map(|row| row.try_get("tag")).collect()
}

/// Returns the post-increment counter value, or `None` if no post matches.
/// The increment is a single-statement atomic update; concurrent calls never
/// lose updates.
#[tracing::instrument(name = "Increment like counter", skip(pool))]
pub async fn increment_likes(pool: &PgPool, blog_id: Uuid) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query(
        "UPDATE blog_posts SET likes = likes + 1, updated_at = now() \
         WHERE id = $1 RETURNING likes",
    )
    .bind(blog_id)
    .fetch_optional(pool)
    .await?;
    row.map(|row| row.try_get("likes")).transpose()
}

#[tracing::instrument(name = "Increment read counter", skip(pool))]
pub async fn increment_read_count(
    pool: &PgPool,
    blog_id: Uuid,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query(
        "UPDATE blog_posts SET read_count = read_count + 1, updated_at = now() \
         WHERE id = $1 RETURNING read_count",
    )
    .bind(blog_id)
    .fetch_optional(pool)
    .await?;
    row.map(|row| row.try_get("read_count")).transpose()
}

/// Appends one comment to the post's embedded array in a single atomic
/// statement. Returns whether the post existed.
#[tracing::instrument(name = "Append comment in database", skip(pool, comment))]
pub async fn append_comment(
    pool: &PgPool,
    blog_id: Uuid,
    comment: &Comment,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE blog_posts SET comments = comments || $2, updated_at = now() \
         WHERE id = $1",
    )
    .bind(blog_id)
    .bind(Json(comment))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[tracing::instrument(name = "Fetch blog post by id from database", skip(pool))]
pub async fn get_post(pool: &PgPool, blog_id: Uuid) -> Result<Option<BlogPost>, sqlx::Error> {
    let query = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1");
    let row = sqlx::query(&query)
        .bind(blog_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(post_from_row).transpose()
}

#[tracing::instrument(name = "Fetch content blocks from database", skip(pool))]
pub async fn get_blocks(pool: &PgPool, blog_id: Uuid) -> Result<Vec<Block>, sqlx::Error> {
    sqlx::query(
        "SELECT kind, content FROM content_blocks \
         WHERE blog_id = $1 ORDER BY block_index ASC",
    )
    .bind(blog_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(block_from_row)
    .collect()
}

/// Inserts the post and, when present, its block set, in one transaction.
#[tracing::instrument(name = "Insert blog post into database", skip(pool, new_post))]
pub async fn insert_post(pool: &PgPool, new_post: &NewBlogPost) -> Result<BlogPost, sqlx::Error> {
    let mut transaction = pool.begin().await?;
    let blog_id = Uuid::new_v4();
    let query = format!(
        r#"
        INSERT INTO blog_posts (id, title, summary, content, cover_image, tags)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {POST_COLUMNS}
        "#
    );
    let row = sqlx::query(&query)
        .bind(blog_id)
        .bind(&new_post.title)
        .bind(&new_post.summary)
        .bind(&new_post.content)
        .bind(new_post.cover_image.as_deref())
        .bind(&new_post.tags)
        .fetch_one(&mut *transaction)
        .await?;
    let post = post_from_row(&row)?;
    if !new_post.blocks.is_empty() {
        replace_blocks(&mut transaction, blog_id, &new_post.blocks).await?;
    }
    transaction.commit().await?;
    Ok(post)
}

/// Applies the provided fields and, when the update carries blocks, replaces
/// the post's whole block set, in one transaction. Returns the updated post
/// and, if blocks were replaced, the re-read persisted sequence. `None` if no
/// post matches.
#[tracing::instrument(name = "Update blog post in database", skip(pool, update))]
pub async fn update_post(
    pool: &PgPool,
    blog_id: Uuid,
    update: &BlogPostUpdate,
) -> Result<Option<(BlogPost, Option<Vec<Block>>)>, sqlx::Error> {
    let mut transaction = pool.begin().await?;
    let query = format!(
        r#"
        UPDATE blog_posts SET
            title = COALESCE($2, title),
            summary = COALESCE($3, summary),
            content = COALESCE($4, content),
            cover_image = COALESCE($5, cover_image),
            tags = COALESCE($6, tags),
            updated_at = now()
        WHERE id = $1
        RETURNING {POST_COLUMNS}
        "#
    );
    let row = sqlx::query(&query)
        .bind(blog_id)
        .bind(update.title.as_deref())
        .bind(update.summary.as_deref())
        .bind(update.content.as_deref())
        .bind(update.cover_image.as_deref())
        .bind(update.tags.as_deref())
        .fetch_optional(&mut *transaction)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let post = post_from_row(&row)?;
    if update.replaces_blocks() {
        replace_blocks(&mut transaction, blog_id, &update.blocks).await?;
    }
    transaction.commit().await?;
    let blocks = if update.replaces_blocks() {
        // Re-read so the response carries the authoritative persisted
        // sequence, unlike creation which echoes the input.
        Some(get_blocks(pool, blog_id).await?)
    } else {
        None
    };
    Ok(Some((post, blocks)))
}

/// Deletes the post row and all block rows referencing it, in one
/// transaction. Returns whether the post existed.
#[tracing::instrument(name = "Delete blog post from database", skip(pool))]
pub async fn delete_post(pool: &PgPool, blog_id: Uuid) -> Result<bool, sqlx::Error> {
    let mut transaction = pool.begin().await?;
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(blog_id)
        .execute(&mut *transaction)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }
    sqlx::query("DELETE FROM content_blocks WHERE blog_id = $1")
        .bind(blog_id)
        .execute(&mut *transaction)
        .await?;
    transaction.commit().await?;
    Ok(true)
}

/// Full replace: delete all existing block rows for the post, then insert the
/// new sequence tagged with zero-based positions. Never a partial patch.
async fn replace_blocks(
    transaction: &mut Transaction<'_, Postgres>,
    blog_id: Uuid,
    blocks: &[Block],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM content_blocks WHERE blog_id = $1")
        .bind(blog_id)
        .execute(&mut **transaction)
        .await?;
    for (index, block) in blocks.iter().enumerate() {
        sqlx::query(
            "INSERT INTO content_blocks (id, blog_id, block_index, kind, content) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(blog_id)
        .bind(index as i32)
        .bind(block.kind.as_str())
        .bind(&block.content)
        .execute(&mut **transaction)
        .await?;
    }
    Ok(())
}
