//! Posts and their comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CommentId, PostId, SubjectId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub id:          PostId,
  pub title:       String,
  pub description: String,
  #[serde(with = "crate::date::wire")]
  pub date:        DateTime<Utc>,
  #[serde(rename = "themeId")]
  pub subject_id:  SubjectId,
  #[serde(rename = "userId")]
  pub author_id:   UserId,
}

/// Body of `POST /api/post` and `PUT /api/post/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
  pub title:       String,
  pub description: String,
  #[serde(rename = "themeId")]
  pub subject_id:  SubjectId,
  #[serde(rename = "userId")]
  pub author_id:   UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
  pub id:          CommentId,
  /// Older server builds omit this; the detail view fills it in.
  #[serde(rename = "postId", default)]
  pub post_id:     Option<PostId>,
  #[serde(rename = "userId")]
  pub author_id:   UserId,
  pub description: String,
  #[serde(with = "crate::date::wire_opt", default)]
  pub date:        Option<DateTime<Utc>>,
}

/// Body of `POST /api/post/:id/comment`.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
  #[serde(rename = "postId")]
  pub post_id:     PostId,
  #[serde(rename = "userId")]
  pub author_id:   UserId,
  pub description: String,
  #[serde(with = "crate::date::wire")]
  pub date:        DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  pub fn as_str(self) -> &'static str {
    match self {
      SortOrder::Asc => "asc",
      SortOrder::Desc => "desc",
    }
  }

  pub fn reversed(self) -> Self {
    match self {
      SortOrder::Asc => SortOrder::Desc,
      SortOrder::Desc => SortOrder::Asc,
    }
  }
}

/// Query parameters of `GET /api/post`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
  pub sort_by: String,
  pub order:   SortOrder,
}

impl Default for PostQuery {
  fn default() -> Self {
    Self {
      sort_by: "date".into(),
      order:   SortOrder::default(),
    }
  }
}
