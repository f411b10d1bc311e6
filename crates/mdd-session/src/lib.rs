//! Session state for the mdd client.
//!
//! [`SessionStore`] is the single source of truth for who is logged in.
//! [`RouteGuard`] reads it synchronously to gate protected views.
//! [`MemoryPersistence`] is the non-durable persistence backend.

pub mod guard;
pub mod memory;
pub mod store;

pub use guard::{Navigation, Route, RouteGuard};
pub use memory::MemoryPersistence;
pub use store::{Generation, SessionObserver, SessionStore};
