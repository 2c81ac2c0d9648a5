use crate::model::Id;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A post as every component outside the store sees it.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: String,
    pub author: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub hidden: bool,
}

/// Canonical input for creating or updating a post. Absent fields are left alone.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PartialPost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

/// A validated create request. `date` falls back to the creation time.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreatePost {
    pub title: String,
    pub author: String,
    pub body: String,
    pub date: Option<OffsetDateTime>,
    pub hidden: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostField {
    Title,
    Author,
    Body,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Error)]
#[error("Missing or empty required fields: {}", display_fields(.0))]
pub struct MissingFieldsError(pub Vec<PostField>);

fn display_fields(fields: &[PostField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl PostField {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Author => "author",
            PostField::Body => "body",
        }
    }
}

impl Display for PostField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl MissingFieldsError {
    #[must_use]
    pub fn fields(&self) -> &[PostField] {
        &self.0
    }
}

fn missing_fields(title: &str, author: &str, body: &str) -> Result<(), MissingFieldsError> {
    let missing: Vec<_> = [
        (PostField::Title, title),
        (PostField::Author, author),
        (PostField::Body, body),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingFieldsError(missing))
    }
}

impl TryFrom<PartialPost> for CreatePost {
    type Error = MissingFieldsError;

    fn try_from(value: PartialPost) -> Result<Self, Self::Error> {
        let title = value.title.unwrap_or_default();
        let author = value.author.unwrap_or_default();
        let body = value.body.unwrap_or_default();
        missing_fields(&title, &author, &body)?;

        Ok(Self {
            title,
            author,
            body,
            date: value.date,
            hidden: value.hidden.unwrap_or(false),
        })
    }
}

impl Post {
    #[must_use]
    pub fn new(id: Id<PostMarker>, post: CreatePost, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            title: post.title,
            author: post.author,
            body: post.body,
            date: post.date.unwrap_or(created_at),
            hidden: post.hidden,
        }
    }

    /// Replaces every field present in `update`, except `date`: a post keeps its creation date.
    ///
    /// Nothing is changed if the result would leave a required field empty.
    pub fn apply(&mut self, update: PartialPost) -> Result<(), MissingFieldsError> {
        let title = update.title.as_deref().unwrap_or(&self.title);
        let author = update.author.as_deref().unwrap_or(&self.author);
        let body = update.body.as_deref().unwrap_or(&self.body);
        missing_fields(title, author, body)?;

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(hidden) = update.hidden {
            self.hidden = hidden;
        }

        Ok(())
    }
}
