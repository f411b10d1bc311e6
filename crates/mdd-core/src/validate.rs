//! Input checks run before any network call.
//!
//! Each function returns [`Error::Validation`] naming the first offending
//! field, so the caller can surface it without a round trip.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
  Error, Result,
  post::{NewComment, NewPost},
  principal::{Credentials, ProfileUpdate, Registration},
};

/// Longest accepted post body.
pub const MAX_POST_DESCRIPTION: usize = 2000;

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern")
});

fn invalid(msg: impl Into<String>) -> Error { Error::Validation(msg.into()) }

fn required(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(invalid(format!("{field} is required")));
  }
  Ok(())
}

pub fn email(value: &str) -> Result<()> {
  required("email", value)?;
  if !EMAIL.is_match(value.trim()) {
    return Err(invalid("email is not a valid address"));
  }
  Ok(())
}

fn password_length(value: &str) -> Result<()> {
  if value.chars().count() < MIN_PASSWORD_LEN {
    return Err(invalid(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

/// Length plus one digit, one lower-case, one upper-case and one symbol.
pub fn strong_password(value: &str) -> Result<()> {
  password_length(value)?;
  let has = |pred: fn(char) -> bool| value.chars().any(pred);
  if !(has(|c| c.is_ascii_digit())
    && has(char::is_lowercase)
    && has(char::is_uppercase)
    && has(|c| !c.is_alphanumeric()))
  {
    return Err(invalid(
      "password needs a digit, a lower-case letter, an upper-case letter and a symbol",
    ));
  }
  Ok(())
}

pub fn credentials(c: &Credentials) -> Result<()> {
  email(&c.email)?;
  password_length(&c.password)
}

pub fn registration(r: &Registration) -> Result<()> {
  email(&r.email)?;
  required("user name", &r.user_name)?;
  strong_password(&r.password)
}

pub fn profile_update(u: &ProfileUpdate) -> Result<()> {
  required("user name", &u.user_name)?;
  email(&u.email)?;
  password_length(&u.password)
}

pub fn new_post(p: &NewPost) -> Result<()> {
  required("title", &p.title)?;
  if p.subject_id.0 <= 0 {
    return Err(invalid("subject is required"));
  }
  required("description", &p.description)?;
  if p.description.chars().count() > MAX_POST_DESCRIPTION {
    return Err(invalid(format!(
      "description must be at most {MAX_POST_DESCRIPTION} characters"
    )));
  }
  Ok(())
}

pub fn new_comment(c: &NewComment) -> Result<()> { required("comment", &c.description) }
