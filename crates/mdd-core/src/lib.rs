//! Core types and trait definitions for the mdd client.
//!
//! This crate is deliberately free of HTTP, database and runtime
//! dependencies. Every other crate in the workspace depends on it.

// Native `async fn` in traits; the traits spell out their `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod api;
pub mod date;
pub mod error;
pub mod id;
pub mod post;
pub mod principal;
pub mod subject;
pub mod token;
pub mod validate;
pub mod view;

pub use error::{Error, ErrorKind, Result};
pub use id::{CommentId, PostId, SubjectId, UserId};
