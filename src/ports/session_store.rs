//! Session Store Port - per-user conversation state.
//!
//! One mutable session record per chat identity, with get-or-create
//! semantics. Backed by an in-process map for single-instance deployments
//! or Redis when the host scales horizontally; controller code depends
//! only on this trait.
//!
//! # Contract
//!
//! - `get` never fails: for a never-seen user it returns a fresh idle
//!   session, and a backend error degrades to the same (logged by the
//!   implementation).
//! - `clear` is idempotent and safe to call for absent users.
//! - No concurrency control is provided. Two rapid events from the same
//!   user may read the same session snapshot and race on `put`; last
//!   write wins. This is a known hazard of the webhook model, not a
//!   correctness guarantee.

use async_trait::async_trait;

use crate::domain::foundation::LineUserId;
use crate::domain::session::Session;

/// Port for reading and mutating per-user conversation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the user's session, creating a fresh idle one if absent or
    /// expired.
    async fn get(&self, user: &LineUserId) -> Session;

    /// Stores the user's session.
    async fn put(&self, user: &LineUserId, session: Session);

    /// Removes any tracked state for the user. Idempotent.
    async fn clear(&self, user: &LineUserId);
}
