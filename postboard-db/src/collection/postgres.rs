use crate::{
    collection::{CollectionError, DocumentCollection, Result, StoredDocument},
    record::DocumentRecord,
};
use async_trait::async_trait;
use postboard_common::model::{Id, post::PostMarker};
use serde_json::Value;
use sqlx::{PgPool, query, query_as, query_scalar, types::Json};
use tracing::debug;

/// Stores every document as a JSONB value in `posts.posts`, keyed by the raw id bytes.
#[derive(Clone, Debug)]
pub struct PgCollection {
    pool: PgPool,
}

impl PgCollection {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        debug!("Ensuring the posts schema exists");

        query("CREATE SCHEMA IF NOT EXISTS posts")
            .execute(&self.pool)
            .await?;
        query(
            "
            CREATE TABLE IF NOT EXISTS posts.posts (
                post_seq BIGINT GENERATED ALWAYS AS IDENTITY,
                post_id BYTEA PRIMARY KEY,
                document JSONB NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn id_bytes(id: Id<PostMarker>) -> Vec<u8> {
    id.object_id().bytes().to_vec()
}

#[async_trait]
impl DocumentCollection for PgCollection {
    async fn find_all(&self) -> Result<Vec<StoredDocument>> {
        let records = query_as::<_, DocumentRecord>(
            "
            SELECT
                posts.post_id,
                posts.document
            FROM
                posts.posts
            ORDER BY
                posts.post_seq
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(StoredDocument::try_from).collect()
    }

    async fn find_one(&self, id: Id<PostMarker>) -> Result<Option<Value>> {
        let document = query_scalar::<_, Json<Value>>(
            "
            SELECT
                posts.document
            FROM
                posts.posts
            WHERE
                posts.post_id = $1
            ",
        )
        .bind(id_bytes(id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|Json(document)| document))
    }

    async fn insert_one(&self, id: Id<PostMarker>, document: Value) -> Result<()> {
        let inserted = query(
            "
            INSERT INTO posts.posts (post_id, document)
            VALUES ($1, $2)
            ON CONFLICT (post_id) DO NOTHING
            ",
        )
        .bind(id_bytes(id))
        .bind(Json(document))
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(CollectionError::DuplicateId(id));
        }

        Ok(())
    }

    async fn replace_one(&self, id: Id<PostMarker>, document: Value) -> Result<bool> {
        let replaced = query(
            "
            UPDATE posts.posts
            SET document = $2
            WHERE posts.post_id = $1
            ",
        )
        .bind(id_bytes(id))
        .bind(Json(document))
        .execute(&self.pool)
        .await?;

        Ok(replaced.rows_affected() > 0)
    }

    async fn delete_one(&self, id: Id<PostMarker>) -> Result<bool> {
        let deleted = query(
            "
            DELETE FROM posts.posts
            WHERE posts.post_id = $1
            ",
        )
        .bind(id_bytes(id))
        .execute(&self.pool)
        .await?;

        Ok(deleted.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
