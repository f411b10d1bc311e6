//! View orchestration for the mdd client.
//!
//! The [`JoinOrchestrator`] composes resource calls into view models. Each
//! view ([`PostList`], [`PostDetail`], [`PostForm`], [`SubjectList`],
//! [`ProfileView`]) is one activation: it owns a [`ViewScope`] that cancels
//! its outstanding work and discards its [`LookupCache`] when the view is
//! torn down or dropped.

pub mod cache;
pub mod detail;
pub mod orchestrator;
pub mod posts;
pub mod profile;
pub mod scope;
pub mod subjects;

#[cfg(test)]
mod fake;

pub use cache::LookupCache;
pub use detail::{DetailState, PostDetail};
pub use orchestrator::JoinOrchestrator;
pub use posts::{PostForm, PostList};
pub use profile::ProfileView;
pub use scope::{ScopeHandle, ViewScope};
pub use subjects::SubjectList;
