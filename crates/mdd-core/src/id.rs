//! Strongly typed identifiers over the server's 64-bit keys.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }

    impl FromStr for $name {
      type Err = std::num::ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
    }

    impl From<i64> for $name {
      fn from(v: i64) -> Self { Self(v) }
    }
  };
}

id_type!(
  /// Identifies a user account (and therefore a post or comment author).
  UserId
);
id_type!(PostId);
id_type!(
  /// Identifies a subject (a "theme" on the wire).
  SubjectId
);
id_type!(CommentId);
