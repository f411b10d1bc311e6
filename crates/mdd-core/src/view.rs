//! View models, computed by the join orchestrator, never stored.

use serde::Serialize;

use crate::{post::{Comment, Post}, subject::Subject};

/// Display name used when an author lookup fails.
pub const UNKNOWN_AUTHOR: &str = "Unknown user";

/// Title used when a subject lookup fails.
pub const UNKNOWN_SUBJECT: &str = "Unknown subject";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
  pub post:        Post,
  pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
  pub comment:        Comment,
  pub author_name:    String,
  /// Empty when the server sent no date.
  pub formatted_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectView {
  pub subject:  Subject,
  /// View-local; never sent to the server.
  pub followed: bool,
}

/// A post with its subject title and enriched comments, in fetch order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetailView {
  pub post:          PostView,
  pub subject_title: String,
  pub comments:      Vec<CommentView>,
}
