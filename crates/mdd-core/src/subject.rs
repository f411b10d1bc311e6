//! Subjects ("themes" server-side) that users follow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SubjectId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub id:             SubjectId,
  pub title:          String,
  #[serde(default)]
  pub description:    String,
  #[serde(with = "crate::date::wire_opt", default)]
  pub date:           Option<DateTime<Utc>>,
  #[serde(rename = "subscriberIds", default)]
  pub subscriber_ids: Vec<UserId>,
}

/// `GET /api/subject` wraps the list in an object.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectList {
  pub subject: Vec<Subject>,
}
