//! Current-session cell and the serialized session-change channel.
//!
//! [`SessionState`] is what a provider updates whenever its session transitions (sign-in,
//! sign-out, token refresh). Listeners registered through [`SessionState::subscribe`] get one
//! delivery with the state at registration time and then one per transition.
//!
//! Deliveries go through a single queue drained by one caller at a time. Listeners therefore
//! run outside every lock, in transition order, and never concurrently or re-entrantly: a
//! transition triggered from inside a listener is queued and delivered after that listener
//! returns.

// std
use std::{collections::BTreeMap, sync::Weak};
// self
use crate::{_prelude::*, auth::Session};

/// Callback invoked with the current session (`None` when signed out).
pub type SessionListener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

type ListenerId = u64;

/// Shared current-session cell plus listener registry.
#[derive(Clone, Default)]
pub struct SessionState {
	inner: Arc<Mutex<Registry>>,
}
impl SessionState {
	/// Creates a state seeded with `session`, without notifying anyone.
	pub fn with_session(session: Option<Session>) -> Self {
		let state = Self::default();

		state.inner.lock().current = session;

		state
	}

	/// Returns a snapshot of the current session.
	pub fn current(&self) -> Option<Session> {
		self.inner.lock().current.clone()
	}

	/// Replaces the current session and notifies listeners when it changed.
	///
	/// Returns `true` if a transition was recorded.
	pub fn replace(&self, session: Option<Session>) -> bool {
		{
			let mut registry = self.inner.lock();

			if registry.current == session {
				return false;
			}

			registry.current = session.clone();
			registry.queue.push_back(Delivery { target: Target::All, session });
		}

		self.drain();

		true
	}

	/// Registers `listener` and schedules its initial delivery.
	pub fn subscribe<F>(&self, listener: F) -> SessionSubscription
	where
		F: 'static + Fn(Option<&Session>) + Send + Sync,
	{
		let id = {
			let mut registry = self.inner.lock();
			let id = registry.next_id;

			registry.next_id += 1;
			registry.listeners.insert(id, Arc::new(listener));

			let session = registry.current.clone();

			registry.queue.push_back(Delivery { target: Target::Listener(id), session });

			id
		};

		self.drain();

		SessionSubscription { id, registry: Arc::downgrade(&self.inner) }
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.lock().listeners.len()
	}

	fn drain(&self) {
		{
			let mut registry = self.inner.lock();

			if registry.dispatching {
				return;
			}

			registry.dispatching = true;
		}

		let mut guard = DispatchGuard { registry: &self.inner, released: false };

		loop {
			let (targets, session) = {
				let mut registry = self.inner.lock();
				// Release under the lock that observed the empty queue.
				let Some(delivery) = registry.queue.pop_front() else {
					registry.dispatching = false;
					guard.released = true;

					return;
				};
				let targets = match delivery.target {
					Target::All => registry.listeners.keys().copied().collect(),
					Target::Listener(id) => vec![id],
				};

				(targets, delivery.session)
			};

			for id in targets {
				// Re-check membership so a listener removed mid-delivery is skipped.
				let listener = self.inner.lock().listeners.get(&id).cloned();

				if let Some(listener) = listener {
					listener(session.as_ref());
				}
			}
		}
	}
}
impl Debug for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let registry = self.inner.lock();

		f.debug_struct("SessionState")
			.field("current", &registry.current)
			.field("listeners", &registry.listeners.len())
			.field("pending", &registry.queue.len())
			.finish()
	}
}

/// Handle returned by [`SessionState::subscribe`]; unsubscribes on drop.
#[must_use = "dropping the subscription unsubscribes the listener"]
#[derive(Debug)]
pub struct SessionSubscription {
	id: ListenerId,
	registry: Weak<Mutex<Registry>>,
}
impl SessionSubscription {
	/// Removes the listener; no deliveries start after this returns.
	pub fn unsubscribe(self) {
		drop(self);
	}

	/// Returns `true` while the listener is still registered.
	pub fn is_active(&self) -> bool {
		self.registry
			.upgrade()
			.is_some_and(|registry| registry.lock().listeners.contains_key(&self.id))
	}
}
impl Drop for SessionSubscription {
	fn drop(&mut self) {
		if let Some(registry) = self.registry.upgrade() {
			registry.lock().listeners.remove(&self.id);
		}
	}
}

#[derive(Default)]
struct Registry {
	current: Option<Session>,
	listeners: BTreeMap<ListenerId, SessionListener>,
	next_id: ListenerId,
	queue: VecDeque<Delivery>,
	dispatching: bool,
}

struct Delivery {
	target: Target,
	session: Option<Session>,
}

enum Target {
	All,
	Listener(ListenerId),
}

// Clears the dispatching flag when a listener panics mid-drain.
struct DispatchGuard<'a> {
	registry: &'a Mutex<Registry>,
	released: bool,
}
impl Drop for DispatchGuard<'_> {
	fn drop(&mut self) {
		if !self.released {
			self.registry.lock().dispatching = false;
		}
	}
}
