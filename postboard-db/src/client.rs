use crate::{
    adapter::{DocumentError, is_legacy, normalize_outgoing, to_document},
    collection::{CollectionError, DocumentCollection, InMemoryCollection},
};
use postboard_common::{
    model::{
        Id,
        post::{CreatePost, MissingFieldsError, PartialPost, Post, PostMarker},
    },
    object_id::ObjectIdGenerator,
};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("A document in the collection was invalid: {0}")]
    Document(#[from] DocumentError),
    #[error("The update would leave the post invalid: {0}")]
    InvalidUpdate(#[from] MissingFieldsError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// Handle to the post collection. Opened once at startup and shared between requests.
#[derive(Debug)]
pub struct DbClient {
    collection: Box<dyn DocumentCollection>,
    id_generator: ObjectIdGenerator,
}

impl DbClient {
    #[must_use]
    pub fn new(collection: impl DocumentCollection + 'static) -> Self {
        Self::with_generator(collection, ObjectIdGenerator::random())
    }

    #[must_use]
    pub fn with_generator(
        collection: impl DocumentCollection + 'static,
        id_generator: ObjectIdGenerator,
    ) -> Self {
        Self {
            collection: Box::new(collection),
            id_generator,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(InMemoryCollection::new())
    }

    /// All posts, newest first. Posts with the same date keep their insertion order.
    pub async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self
            .collection
            .find_all()
            .await?
            .into_iter()
            .map(|stored| normalize_outgoing(stored.id, stored.document))
            .collect::<Result<Vec<_>, _>>()?;

        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let document = self.collection.find_one(post_id).await?;

        let post = document
            .map(|document| normalize_outgoing(post_id, document))
            .transpose()?;
        Ok(post)
    }

    pub async fn create_post(&self, post: CreatePost) -> Result<Post> {
        self.create_post_at(post, OffsetDateTime::now_utc()).await
    }

    pub async fn create_post_at(&self, post: CreatePost, now: OffsetDateTime) -> Result<Post> {
        let post_id: Id<PostMarker> = self.id_generator.generate_at(now).into();
        let post = Post::new(post_id, post, now);

        self.collection
            .insert_one(post_id, to_document(&post)?)
            .await?;

        info!(%post_id, "Created post");
        Ok(post)
    }

    /// Applies a partial update and writes the whole document back in canonical form.
    ///
    /// Returns `None` if there is no post with that id.
    pub async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        update: PartialPost,
    ) -> Result<Option<Post>> {
        let Some(document) = self.collection.find_one(post_id).await? else {
            return Ok(None);
        };
        if is_legacy(&document) {
            debug!(%post_id, "Rewriting legacy document in canonical form");
        }

        let mut post = normalize_outgoing(post_id, document)?;
        post.apply(update)?;

        // The document may have been deleted since it was read.
        if !self
            .collection
            .replace_one(post_id, to_document(&post)?)
            .await?
        {
            return Ok(None);
        }

        info!(%post_id, "Updated post");
        Ok(Some(post))
    }

    /// Returns `false` if there is no post with that id.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let deleted = self.collection.delete_one(post_id).await?;
        if deleted {
            info!(%post_id, "Deleted post");
        }

        Ok(deleted)
    }

    pub async fn close(&self) {
        self.collection.close().await;
    }
}
