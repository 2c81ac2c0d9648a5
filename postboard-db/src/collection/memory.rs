use crate::collection::{CollectionError, DocumentCollection, Result, StoredDocument};
use async_trait::async_trait;
use postboard_common::model::{Id, post::PostMarker};
use serde_json::Value;
use tokio::sync::RwLock;

/// Keeps documents in process memory. Everything is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    documents: RwLock<Vec<StoredDocument>>,
}

impl InMemoryCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    async fn find_all(&self) -> Result<Vec<StoredDocument>> {
        Ok(self.documents.read().await.clone())
    }

    async fn find_one(&self, id: Id<PostMarker>) -> Result<Option<Value>> {
        let documents = self.documents.read().await;
        let document = documents
            .iter()
            .find(|stored| stored.id == id)
            .map(|stored| stored.document.clone());

        Ok(document)
    }

    async fn insert_one(&self, id: Id<PostMarker>, document: Value) -> Result<()> {
        let mut documents = self.documents.write().await;
        if documents.iter().any(|stored| stored.id == id) {
            return Err(CollectionError::DuplicateId(id));
        }

        documents.push(StoredDocument { id, document });
        Ok(())
    }

    async fn replace_one(&self, id: Id<PostMarker>, document: Value) -> Result<bool> {
        let mut documents = self.documents.write().await;
        let Some(stored) = documents.iter_mut().find(|stored| stored.id == id) else {
            return Ok(false);
        };

        stored.document = document;
        Ok(true)
    }

    async fn delete_one(&self, id: Id<PostMarker>) -> Result<bool> {
        let mut documents = self.documents.write().await;
        let Some(position) = documents.iter().position(|stored| stored.id == id) else {
            return Ok(false);
        };

        documents.remove(position);
        Ok(true)
    }
}
