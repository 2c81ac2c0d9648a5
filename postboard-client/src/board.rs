//! State behind the post list and its create/edit forms.
//!
//! The list is never patched locally: every successful mutation is followed by a full refetch.
//! Failures only set [`Board::alert`] and otherwise leave the state alone.

use crate::api::PostsApi;
use postboard_common::model::{
    Id,
    post::{PartialPost, Post, PostField, PostMarker},
};
use tracing::warn;

pub const FETCH_FAILED: &str = "Error fetching posts";
pub const CREATE_FAILED: &str = "Failed to create post";
pub const UPDATE_FAILED: &str = "Failed to update post";
pub const DELETE_FAILED: &str = "Failed to delete post";
pub const FIELDS_REQUIRED: &str = "Title, author and body are required";

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostForm {
    pub title: String,
    pub author: String,
    pub body: String,
}

impl PostForm {
    #[must_use]
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            author: post.author.clone(),
            body: post.body.clone(),
        }
    }

    pub fn set(&mut self, field: PostField, value: String) {
        match field {
            PostField::Title => self.title = value,
            PostField::Author => self.author = value,
            PostField::Body => self.body = value,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !(self.title.is_empty() || self.author.is_empty() || self.body.is_empty())
    }

    fn to_partial(&self) -> PartialPost {
        PartialPost {
            title: Some(self.title.clone()),
            author: Some(self.author.clone()),
            body: Some(self.body.clone()),
            ..PartialPost::default()
        }
    }

    /// Only the fields that differ from `post`.
    fn changes_from(&self, post: &Post) -> PartialPost {
        let changed = |new: &String, old: &String| (new != old).then(|| new.clone());

        PartialPost {
            title: changed(&self.title, &post.title),
            author: changed(&self.author, &post.author),
            body: changed(&self.body, &post.body),
            ..PartialPost::default()
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
struct Editing {
    post: Post,
    form: PostForm,
}

/// The form currently on screen. There is always exactly one.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum VisibleForm<'a> {
    Create(&'a PostForm),
    Edit {
        id: Id<PostMarker>,
        form: &'a PostForm,
    },
}

impl VisibleForm<'_> {
    #[must_use]
    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit { .. })
    }
}

#[derive(Debug)]
pub struct Board<A> {
    api: A,
    posts: Vec<Post>,
    create_form: PostForm,
    editing: Option<Editing>,
    pending_delete: Option<Id<PostMarker>>,
    alert: Option<String>,
}

impl<A: PostsApi> Board<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            posts: Vec::new(),
            create_form: PostForm::default(),
            editing: None,
            pending_delete: None,
            alert: None,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn pending_delete(&self) -> Option<Id<PostMarker>> {
        self.pending_delete
    }

    pub fn visible_form(&self) -> VisibleForm<'_> {
        match &self.editing {
            Some(editing) => VisibleForm::Edit {
                id: editing.post.id,
                form: &editing.form,
            },
            None => VisibleForm::Create(&self.create_form),
        }
    }

    /// The form currently on screen, for typing into.
    pub fn visible_form_mut(&mut self) -> &mut PostForm {
        match &mut self.editing {
            Some(editing) => &mut editing.form,
            None => &mut self.create_form,
        }
    }

    fn fail(&mut self, message: &str) {
        self.alert = Some(message.to_owned());
    }

    /// Replaces the list with the server's. On failure the old list stays.
    pub async fn refresh(&mut self) {
        match self.api.list_posts().await {
            Ok(posts) => self.posts = posts,
            Err(err) => {
                warn!(%err, "Fetching posts failed");
                self.fail(FETCH_FAILED);
            }
        }
    }

    /// Submits the create form. Returns whether the post was created.
    pub async fn submit_create(&mut self) -> bool {
        if !self.create_form.is_complete() {
            self.fail(FIELDS_REQUIRED);
            return false;
        }

        match self.api.create_post(&self.create_form.to_partial()).await {
            Ok(_) => {
                self.create_form = PostForm::default();
                self.refresh().await;
                true
            }
            Err(err) => {
                warn!(%err, "Creating post failed");
                self.fail(CREATE_FAILED);
                false
            }
        }
    }

    /// Switches to the edit form for a listed post. Returns `false` if it is not listed.
    pub fn start_edit(&mut self, id: Id<PostMarker>) -> bool {
        let Some(post) = self.posts.iter().find(|post| post.id == id) else {
            return false;
        };

        self.editing = Some(Editing {
            form: PostForm::from_post(post),
            post: post.clone(),
        });
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Saves the fields changed in the edit form. Returns whether the save went through.
    pub async fn submit_edit(&mut self) -> bool {
        let Some(editing) = &self.editing else {
            return false;
        };
        if !editing.form.is_complete() {
            self.fail(FIELDS_REQUIRED);
            return false;
        }

        let id = editing.post.id;
        let changes = editing.form.changes_from(&editing.post);
        match self.api.update_post(id, &changes).await {
            Ok(_) => {
                self.editing = None;
                self.refresh().await;
                true
            }
            Err(err) => {
                warn!(%err, %id, "Updating post failed");
                self.fail(UPDATE_FAILED);
                false
            }
        }
    }

    /// Marks a listed post for deletion. Nothing is sent until [`Board::confirm_delete`].
    pub fn request_delete(&mut self, id: Id<PostMarker>) -> bool {
        if !self.posts.iter().any(|post| post.id == id) {
            return false;
        }

        self.pending_delete = Some(id);
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the post marked by [`Board::request_delete`]. Returns whether it was deleted.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.pending_delete.take() else {
            return false;
        };

        match self.api.delete_post(id).await {
            Ok(()) => {
                self.refresh().await;
                true
            }
            Err(err) => {
                warn!(%err, %id, "Deleting post failed");
                self.fail(DELETE_FAILED);
                false
            }
        }
    }
}
