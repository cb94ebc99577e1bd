//! Line-oriented terminal front end: command parsing and plain-text rendering.

use std::fmt::Write as _;

use chrono::Local;
use thiserror::Error;

use crate::feed::FeedView;
use crate::models::{Category, CategoryFilter, DraftField, Post};
use crate::notification::Notification;

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Page(u32),
    Next,
    Prev,
    Filter(CategoryFilter),
    New,
    Set(DraftField, String),
    Submit,
    Cancel,
    Dismiss,
    Login {
        email: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
    },
    Logout,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

impl std::str::FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseError::Empty)?;
        let args: Vec<&str> = words.collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("page", [n]) => {
                let page = n
                    .parse::<u32>()
                    .map_err(|_| ParseError::Invalid(format!("'{n}' is not a page number")))?;
                Self::Page(page)
            }
            ("page", _) => return Err(ParseError::Usage("page <number>")),
            ("next", []) => Self::Next,
            ("prev", []) => Self::Prev,
            ("filter", [value]) => Self::Filter(
                value
                    .parse::<CategoryFilter>()
                    .map_err(|e| ParseError::Invalid(e.to_string()))?,
            ),
            ("filter", _) => {
                return Err(ParseError::Usage(
                    "filter <All|Innovation|Design|Development|Tutorial|Business>",
                ))
            }
            ("new", []) => Self::New,
            ("set", [field, rest @ ..]) => {
                let field = field.parse::<DraftField>().map_err(ParseError::Invalid)?;
                Self::Set(field, rest.join(" "))
            }
            ("set", _) => {
                return Err(ParseError::Usage("set <title|category|content|media> <value>"))
            }
            ("submit", []) => Self::Submit,
            ("cancel", []) => Self::Cancel,
            ("dismiss", []) => Self::Dismiss,
            ("login", [email, password]) => Self::Login {
                email: (*email).to_string(),
                password: (*password).to_string(),
            },
            ("login", _) => return Err(ParseError::Usage("login <email> <password>")),
            ("register", [username, email, password]) => Self::Register {
                username: (*username).to_string(),
                email: (*email).to_string(),
                password: (*password).to_string(),
            },
            ("register", _) => {
                return Err(ParseError::Usage("register <username> <email> <password>"))
            }
            ("logout", []) => Self::Logout,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => return Err(ParseError::Unknown(name.to_string())),
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
commands:
  page <n>                 load page n
  next | prev              move one page
  filter <All|Category>    filter the loaded page
  new                      open the new post dialog
  set <field> <value>      edit title, category, content or media
  submit | cancel          submit or discard the dialog
  dismiss                  hide the notification
  login <email> <password>
  register <username> <email> <password>
  logout
  quit";

fn render_post(out: &mut String, post: &Post) {
    let _ = writeln!(out, "* {}", post.title);
    let _ = writeln!(out, "  Category: {}", post.category.as_deref().unwrap_or("-"));
    if !post.content.is_empty() {
        let _ = writeln!(out, "  {}", post.content);
    }
    if let Some(media) = post.primary_media() {
        let _ = writeln!(out, "  Media: {media}");
    }
    let created_at = post.created_at.map_or_else(
        || "-".to_string(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    let _ = writeln!(
        out,
        "  Likes: {}  Comments: {}  Created at: {created_at}",
        post.like_count(),
        post.comment_count(),
    );
}

#[must_use]
pub fn render_notification(notification: &Notification) -> String {
    format!("[{}] {}", notification.severity.label(), notification.message)
}

/// Render the whole feed screen.
#[must_use]
pub fn render_feed(view: &FeedView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Filter: {}", view.feed.filter);
    if view.visible.is_empty() {
        let _ = writeln!(out, "(no posts)");
    }
    for post in &view.visible {
        render_post(&mut out, post);
    }
    let _ = writeln!(out, "Page {} of {}", view.feed.page, view.feed.total_pages);

    if let Some(draft) = &view.dialog {
        let categories: Vec<_> = Category::ALL.iter().map(Category::as_str).collect();
        let _ = writeln!(out, "-- Add New Post --");
        let _ = writeln!(out, "  title:    {}", draft.title);
        let _ = writeln!(out, "  category: {}  ({})", draft.category, categories.join(", "));
        let _ = writeln!(out, "  content:  {}", draft.content);
        let _ = writeln!(out, "  media:    {}", draft.media);
    }

    if let Some(notification) = &view.notification {
        let _ = writeln!(out, "{}", render_notification(notification));
    }

    out
}
