use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{
    AuthorFields, NewPost, PostFilter, PostInclude, PostQuery, PostRepository,
};
use crate::domain::error::DomainError;
use crate::domain::post::{
    AuthorSummary, CommentDetail, CommentSummary, LikeSummary, Post, PostDetail, PostView,
};

const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PostAuthorRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_username: String,
    author_name: Option<String>,
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CommentDetailRow {
    id: i64,
    content: String,
    created_at: DateTime<Utc>,
    username: Option<String>,
}

#[derive(FromRow)]
struct LikeRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

const POST_WITH_AUTHOR_COLUMNS: &str = r#"
    SELECT
        p.id,
        p.title,
        p.content,
        p.author_id,
        p.created_at,
        u.username AS author_username,
        u.name AS author_name
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id, created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_create_db_error(err, input.author_id))?;

        Post::new(row.id, row.title, row.content, row.author_id, row.created_at)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
            id,
            title,
            content,
            author_id,
            created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(map_row_to_post))
    }

    async fn find_posts(&self, query: PostQuery) -> Result<Vec<PostView>, DomainError> {
        let mut builder = feed_query(&query);
        let rows = builder
            .build_query_as::<PostAuthorRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        let post_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut comments = if query.include.comments {
            Some(self.comments_for(&post_ids).await?)
        } else {
            None
        };
        let mut likes = if query.include.likes {
            Some(self.likes_for(&post_ids).await?)
        } else {
            None
        };

        let views = rows
            .into_iter()
            .map(|row| {
                let post_comments = comments
                    .as_mut()
                    .map(|by_post| by_post.remove(&row.id).unwrap_or_default());
                let post_likes = likes
                    .as_mut()
                    .map(|by_post| by_post.remove(&row.id).unwrap_or_default());
                let (post, author) = split_post_author_row(row, query.include);

                PostView {
                    post,
                    author,
                    comments: post_comments,
                    likes: post_likes,
                }
            })
            .collect();

        Ok(views)
    }

    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(POST_WITH_AUTHOR_COLUMNS);
        builder.push(" WHERE p.id = ").push_bind(id);

        let Some(row) = builder
            .build_query_as::<PostAuthorRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?
        else {
            return Ok(None);
        };

        let comment_rows = sqlx::query_as::<_, CommentDetailRow>(
            r#"
            SELECT
                c.id,
                c.content,
                c.created_at,
                u.username
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        let (post, author) =
            split_post_author_row(row, PostInclude::author_only(AuthorFields::Minimal));
        let summary = post.summary();
        let comments = comment_rows
            .into_iter()
            .map(|row| CommentDetail {
                id: row.id,
                content: row.content,
                created_at: row.created_at,
                username: row.username,
                post: Some(summary.clone()),
            })
            .collect();

        Ok(Some(PostDetail {
            post,
            author,
            comments,
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

impl PostgresPostRepository {
    async fn comments_for(
        &self,
        post_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<CommentSummary>>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, content, created_at
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        let mut by_post: HashMap<i64, Vec<CommentSummary>> = HashMap::new();
        for row in rows {
            let summary = CommentSummary {
                id: row.id,
                content: row.content,
                created_at: row.created_at,
            };
            by_post.entry(row.post_id).or_default().push(summary);
        }
        Ok(by_post)
    }

    async fn likes_for(
        &self,
        post_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<LikeSummary>>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM likes
            WHERE post_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        let mut by_post: HashMap<i64, Vec<LikeSummary>> = HashMap::new();
        for row in rows {
            let summary = LikeSummary {
                id: row.id,
                user_id: row.user_id,
                created_at: row.created_at,
            };
            by_post.entry(row.post_id).or_default().push(summary);
        }
        Ok(by_post)
    }
}

/// Feed query: filter, newest first, then the page window.
fn feed_query(query: &PostQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(POST_WITH_AUTHOR_COLUMNS);
    push_filter(&mut builder, &query.filter);
    builder
        .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
        .push_bind(query.pagination.take())
        .push(" OFFSET ")
        .push_bind(query.pagination.skip());
    builder
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE TRUE");
    if let Some(author_id) = filter.author_id {
        builder.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(window) = filter.created_within {
        builder
            .push(" AND p.created_at >= ")
            .push_bind(window.start)
            .push(" AND p.created_at <= ")
            .push_bind(window.end);
    }
}

fn split_post_author_row(row: PostAuthorRow, include: PostInclude) -> (Post, AuthorSummary) {
    let author = AuthorSummary {
        id: row.author_id,
        username: row.author_username,
        name: match include.author {
            AuthorFields::Minimal => None,
            AuthorFields::WithName => row.author_name,
        },
    };
    let post = map_row_to_post(PostRow {
        id: row.id,
        title: row.title,
        content: row.content,
        author_id: row.author_id,
        created_at: row.created_at,
    });

    (post, author)
}

/// Stored rows are returned as written; validation only guards writes.
fn map_row_to_post(row: PostRow) -> Post {
    Post {
        id: row.id,
        title: row.title,
        content: row.content,
        author_id: row.author_id,
        created_at: row.created_at,
    }
}

fn map_create_db_error(err: sqlx::Error, author_id: i64) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    {
        return DomainError::AuthorNotFound(author_id);
    }
    map_post_db_error(err)
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}
