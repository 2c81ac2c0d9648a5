use crate::collection::{CollectionError, StoredDocument};
use postboard_common::object_id::{OBJECT_ID_LEN, ObjectId};
use serde_json::Value;
use sqlx::{FromRow, types::Json};

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct DocumentRecord {
    pub post_id: Vec<u8>,
    pub document: Json<Value>,
}

pub(crate) fn object_id_from_record(post_id: Vec<u8>) -> Result<ObjectId, CollectionError> {
    let bytes: [u8; OBJECT_ID_LEN] = post_id
        .try_into()
        .map_err(CollectionError::InvalidStoredId)?;

    Ok(ObjectId::from_bytes(bytes))
}

impl TryFrom<DocumentRecord> for StoredDocument {
    type Error = CollectionError;

    fn try_from(value: DocumentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: object_id_from_record(value.post_id)?.into(),
            document: value.document.0,
        })
    }
}
