use crate::db::FeedRepository;
use crate::error::{AppError, Result};
use crate::models::{ContentKind, FeedCandidate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use db_pool::acquire_with_metrics;
use sqlx::PgPool;

const SERVICE_NAME: &str = "feed-service";

/// PostgreSQL-backed feed reads
#[derive(Clone)]
pub struct PgFeedRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    kind: String,
    id: i64,
    author_id: i64,
    content: String,
    emotion: Option<f64>,
    author_nickname: String,
    author_profile_url: Option<String>,
    like_count: i64,
    is_liked: bool,
    media_urls: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for FeedCandidate {
    type Error = AppError;

    fn try_from(row: CandidateRow) -> Result<Self> {
        let kind = row.kind.parse::<ContentKind>().map_err(AppError::Internal)?;

        Ok(FeedCandidate {
            kind,
            id: row.id,
            author_id: row.author_id,
            content: row.content,
            emotion: row.emotion,
            like_count: row.like_count,
            is_liked: row.is_liked,
            author_nickname: row.author_nickname,
            author_profile_url: row.author_profile_url,
            media_urls: row.media_urls,
            created_at: row.created_at,
        })
    }
}

impl PgFeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedRepository for PgFeedRepository {
    async fn latest_story_emotion(&self, viewer_id: i64) -> Result<Option<f64>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME).await?;

        let emotion: Option<Option<f64>> = sqlx::query_scalar(
            r#"
            SELECT emotion_score::float8
            FROM stories
            WHERE user_id = $1
            ORDER BY created_at DESC, story_id DESC
            LIMIT 1
            "#,
        )
        .bind(viewer_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(emotion.flatten())
    }

    async fn post_average_emotion(&self, viewer_id: i64) -> Result<Option<f64>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME).await?;

        // AVG over zero rows is NULL
        let average: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT ROUND(AVG(emotion)::numeric, 2)::float8
            FROM posts
            WHERE user_id = $1
            "#,
        )
        .bind(viewer_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(average)
    }

    async fn candidate_pool(&self, viewer_id: i64) -> Result<Vec<FeedCandidate>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME).await?;

        // Unbounded: every post and story is a candidate on every request.
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT *
            FROM (
                SELECT
                    'POST'::text AS kind,
                    p.post_id::bigint AS id,
                    p.user_id::bigint AS author_id,
                    COALESCE(p.content, '') AS content,
                    p.emotion::float8 AS emotion,
                    u.nickname AS author_nickname,
                    u.profile_image_url AS author_profile_url,
                    (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.post_id) AS like_count,
                    EXISTS (
                        SELECT 1 FROM post_likes pl
                        WHERE pl.post_id = p.post_id AND pl.user_id = $1
                    ) AS is_liked,
                    ARRAY(
                        SELECT pm.media_url::text FROM post_media pm
                        WHERE pm.post_id = p.post_id
                        ORDER BY pm.media_id
                    ) AS media_urls,
                    p.created_at::timestamptz AS created_at
                FROM posts p
                JOIN users u ON u.user_id = p.user_id

                UNION ALL

                SELECT
                    'STORY'::text AS kind,
                    s.story_id::bigint AS id,
                    s.user_id::bigint AS author_id,
                    COALESCE(s.content, '') AS content,
                    s.emotion_score::float8 AS emotion,
                    u.nickname AS author_nickname,
                    u.profile_image_url AS author_profile_url,
                    (SELECT COUNT(*) FROM stories_likes sl WHERE sl.story_id = s.story_id) AS like_count,
                    EXISTS (
                        SELECT 1 FROM stories_likes sl
                        WHERE sl.story_id = s.story_id AND sl.user_id = $1
                    ) AS is_liked,
                    ARRAY(
                        SELECT sm.media_url::text FROM story_media sm
                        WHERE sm.story_id = s.story_id
                        ORDER BY sm.media_id
                    ) AS media_urls,
                    s.created_at::timestamptz AS created_at
                FROM stories s
                JOIN users u ON u.user_id = s.user_id
            ) candidates
            ORDER BY created_at DESC, id DESC, kind
            "#,
        )
        .bind(viewer_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(FeedCandidate::try_from).collect()
    }
}
