use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;

use crate::models::Session;

/// SessionProvider
///
/// Abstract holder of "who is using the portal right now". Access checks only ever
/// read from it; `sign_in` and `sign_out` are the single mutation point.
///
/// Implementations must make `sign_out` visible to every reader before it returns,
/// so no request evaluated afterwards can be authorized with the old role.
///
/// Every write also advances the session generation. Session tokens carry the
/// generation they were issued in and stop being accepted once it moves on.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, if any.
    async fn current_session(&self) -> Option<Session>;

    /// A receiver that is notified every time the session changes.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    /// The generation tokens must carry to be accepted right now.
    fn generation(&self) -> u64;

    /// Replaces the session and returns the generation it was started in.
    async fn sign_in(&self, session: Session) -> u64;

    async fn sign_out(&self);
}

/// InMemorySessionProvider
///
/// Process-local provider backed by a `watch` channel. `send_replace` swaps the
/// value atomically whether or not anyone is subscribed. The generation starts at 0.
pub struct InMemorySessionProvider {
    sender: watch::Sender<Option<Session>>,
    generation: AtomicU64,
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            generation: AtomicU64::new(0),
        }
    }

    /// A provider that starts out signed in. Mostly useful in tests.
    pub fn with_session(session: Session) -> Self {
        let (sender, _) = watch::channel(Some(session));
        Self {
            sender,
            generation: AtomicU64::new(0),
        }
    }
}

impl Default for InMemorySessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    async fn current_session(&self) -> Option<Session> {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn sign_in(&self, session: Session) -> u64 {
        // Tokens of the replaced session die with it.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self.sender.send_replace(Some(session));
        tracing::info!(
            role = %session.role,
            replaced = ?previous.map(|old| old.role),
            generation,
            "Session started"
        );
        generation
    }

    async fn sign_out(&self) {
        // Revoke outstanding tokens before the session itself disappears.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.sender.send_replace(None) {
            tracing::info!(role = %previous.role, generation, "Session cleared");
        }
    }
}

/// SessionState
///
/// The concrete type used to share the session provider across the application state.
pub type SessionState = Arc<dyn SessionProvider>;
