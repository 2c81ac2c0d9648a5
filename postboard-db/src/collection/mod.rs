//! The document collection posts are persisted in.

mod memory;
mod postgres;

pub use memory::InMemoryCollection;
pub use postgres::PgCollection;

use async_trait::async_trait;
use postboard_common::model::{Id, post::PostMarker};
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub type Result<T, E = CollectionError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("A document with id {0} already exists.")]
    DuplicateId(Id<PostMarker>),
    #[error("The collection holds an id that is not 12 bytes long: {0:?}")]
    InvalidStoredId(Vec<u8>),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A raw document together with the id it is stored under.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StoredDocument {
    pub id: Id<PostMarker>,
    pub document: Value,
}

/// Single-document operations on a collection of JSON documents.
///
/// Each operation is atomic on its own; nothing spans more than one document.
#[async_trait]
pub trait DocumentCollection: Debug + Send + Sync {
    /// Every document, in insertion order.
    async fn find_all(&self) -> Result<Vec<StoredDocument>>;

    async fn find_one(&self, id: Id<PostMarker>) -> Result<Option<Value>>;

    async fn insert_one(&self, id: Id<PostMarker>, document: Value) -> Result<()>;

    /// Returns `false` if there is no document with that id.
    async fn replace_one(&self, id: Id<PostMarker>, document: Value) -> Result<bool>;

    /// Returns `false` if there is no document with that id.
    async fn delete_one(&self, id: Id<PostMarker>) -> Result<bool>;

    /// Releases held connections. The collection must not be used afterwards.
    async fn close(&self) {}
}

#[async_trait]
impl<T: DocumentCollection + ?Sized> DocumentCollection for Arc<T> {
    async fn find_all(&self) -> Result<Vec<StoredDocument>> {
        (**self).find_all().await
    }

    async fn find_one(&self, id: Id<PostMarker>) -> Result<Option<Value>> {
        (**self).find_one(id).await
    }

    async fn insert_one(&self, id: Id<PostMarker>, document: Value) -> Result<()> {
        (**self).insert_one(id, document).await
    }

    async fn replace_one(&self, id: Id<PostMarker>, document: Value) -> Result<bool> {
        (**self).replace_one(id, document).await
    }

    async fn delete_one(&self, id: Id<PostMarker>) -> Result<bool> {
        (**self).delete_one(id).await
    }

    async fn close(&self) {
        (**self).close().await;
    }
}
