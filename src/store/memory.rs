//! Thread-safe in-memory [`SessionStore`] for tests and demos.

// self
use crate::{
	_prelude::*,
	auth::Session,
	store::{SessionStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<Session>>>;

/// Keeps the session in-process; clones share the same slot, which lets tests simulate a
/// restart by handing a clone to a fresh provider.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(Slot);
impl MemorySessionStore {
	/// Returns a snapshot of the stored session without going through the async API.
	pub fn snapshot(&self) -> Option<Session> {
		self.0.read().clone()
	}

	fn save_now(slot: Slot, session: Session) -> Result<(), StoreError> {
		*slot.write() = Some(session);

		Ok(())
	}
}
impl SessionStore for MemorySessionStore {
	fn load(&self) -> StoreFuture<'_, Option<Session>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save(&self, session: Session) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(slot, session) })
	}

	fn clear(&self) -> StoreFuture<'_, Option<Session>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.write().take()) })
	}
}
