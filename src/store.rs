//! Session persistence contracts and built-in store implementations.
//!
//! Providers keep the signed-in session in a [`SessionStore`] so it survives process
//! restarts. The facade never touches stores directly.

pub mod file;
pub mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

// self
use crate::{_prelude::*, auth::Session};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the provider's persisted session.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Loads the persisted session, if any.
	fn load(&self) -> StoreFuture<'_, Option<Session>>;

	/// Persists or replaces the session.
	fn save(&self, session: Session) -> StoreFuture<'_, ()>;

	/// Removes the persisted session, returning what was stored.
	fn clear(&self) -> StoreFuture<'_, Option<Session>>;
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
