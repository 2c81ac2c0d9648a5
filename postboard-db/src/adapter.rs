//! Translation between stored post documents and [`Post`].
//!
//! The title field used to be called `tittle`. Documents written back then still carry it, and
//! some clients still send it. This module is the only place that knows about that name: reads
//! accept either field (`title` wins), writes only ever produce `title`.

use postboard_common::model::{
    Id,
    post::{PartialPost, Post, PostMarker},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

pub const TITLE_FIELD: &str = "title";
pub const LEGACY_TITLE_FIELD: &str = "tittle";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document {0} has neither a title nor a legacy title.")]
    MissingTitle(Id<PostMarker>),
    #[error("Document {id} is malformed: {source}")]
    Malformed {
        id: Id<PostMarker>,
        #[source]
        source: serde_json::Error,
    },
    #[error("Post {id} could not be encoded as a document: {source}")]
    Encode {
        id: Id<PostMarker>,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct StoredPost {
    title: Option<String>,
    #[serde(rename = "tittle")]
    legacy_title: Option<String>,
    author: String,
    body: String,
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
    #[serde(default)]
    hidden: bool,
}

#[derive(Serialize)]
struct CanonicalDocument<'a> {
    title: &'a str,
    author: &'a str,
    body: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
    hidden: bool,
}

/// A create or update request body as clients send it.
#[derive(Clone, Eq, PartialEq, Debug, Default, Deserialize)]
pub struct IncomingPost {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "tittle")]
    legacy_title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    date: Option<OffsetDateTime>,
    #[serde(default)]
    hidden: Option<bool>,
}

pub fn normalize_outgoing(id: Id<PostMarker>, document: Value) -> Result<Post, DocumentError> {
    let stored: StoredPost = serde_json::from_value(document)
        .map_err(|source| DocumentError::Malformed { id, source })?;

    let title = stored
        .title
        .or(stored.legacy_title)
        .ok_or(DocumentError::MissingTitle(id))?;

    Ok(Post {
        id,
        title,
        author: stored.author,
        body: stored.body,
        date: stored.date,
        hidden: stored.hidden,
    })
}

#[must_use]
pub fn normalize_incoming(body: IncomingPost) -> PartialPost {
    PartialPost {
        title: body.title.or(body.legacy_title),
        author: body.author,
        body: body.body,
        date: body.date,
        hidden: body.hidden,
    }
}

/// Encodes a post the way it is stored. The result never contains the legacy field.
pub fn to_document(post: &Post) -> Result<Value, DocumentError> {
    let document = CanonicalDocument {
        title: &post.title,
        author: &post.author,
        body: &post.body,
        date: post.date,
        hidden: post.hidden,
    };

    serde_json::to_value(document).map_err(|source| DocumentError::Encode {
        id: post.id,
        source,
    })
}

/// Whether a stored document still uses the legacy title field.
#[must_use]
pub fn is_legacy(document: &Value) -> bool {
    document.get(LEGACY_TITLE_FIELD).is_some()
}
