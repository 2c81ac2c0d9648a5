use crate::{
    api::PostsApi,
    board::{Board, PostForm, VisibleForm},
};
use postboard_common::model::post::Post;
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

pub const EMPTY_STATE: &str = "No posts available.";

const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year] [hour]:[minute] UTC");

#[must_use]
pub fn format_date(date: OffsetDateTime) -> String {
    let date = date.to_offset(UtcOffset::UTC);
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// One list entry. `number` is what the edit and delete commands refer to.
#[must_use]
pub fn render_post(number: usize, post: &Post) -> String {
    let mut out = format!(
        "[{number}] {}\n    by {} · {}\n",
        post.title,
        post.author,
        format_date(post.date)
    );
    for line in post.body.lines() {
        out.push_str(&format!("    {line}\n"));
    }
    out.push_str(&format!("    (edit {number} | delete {number})\n"));
    out
}

fn render_form(heading: &str, form: &PostForm) -> String {
    format!(
        "{heading}\n  title:  {}\n  author: {}\n  body:   {}\n",
        form.title, form.author, form.body
    )
}

#[must_use]
pub fn render_board<A: PostsApi>(board: &Board<A>) -> String {
    let mut out = String::from("Posts\n\n");

    out.push_str(&match board.visible_form() {
        VisibleForm::Create(form) => render_form("Create new post", form),
        VisibleForm::Edit { form, .. } => render_form("Editing (save or cancel)", form),
    });
    out.push('\n');

    if board.posts().is_empty() {
        out.push_str(EMPTY_STATE);
        out.push('\n');
    }
    for (index, post) in board.posts().iter().enumerate() {
        out.push_str(&render_post(index + 1, post));
    }

    if let Some(alert) = board.alert() {
        out.push_str(&format!("\n! {alert}\n"));
    }
    out
}
