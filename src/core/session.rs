//! Session identity and its durable mirror.
//!
//! A session is either anonymous or bound to one [`Identity`]. Every
//! transition bumps a generation counter; async work captures a
//! [`SessionTicket`] when it starts and checks [`SessionStore::is_current`]
//! before applying its result.

use crate::core::identity::Identity;
use crate::core::storage::KeyValueStore;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Storage key holding the active identity.
pub const IDENTITY_KEY: &str = "userId";

/// Snapshot of the session taken when an async operation is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    pub identity: Option<Identity>,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    generation: u64,
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Restores the session persisted in `storage`, or starts anonymous.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let identity = storage
            .get(IDENTITY_KEY)
            .and_then(|token| match Identity::new(token) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!("Ignoring persisted identity: {e}");
                    None
                }
            });

        match &identity {
            Some(id) => info!(identity = %id, "Restored session"),
            None => debug!("No persisted session, starting anonymous"),
        }

        SessionStore {
            state: RwLock::new(SessionState {
                identity,
                generation: 0,
            }),
            storage,
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    pub fn ticket(&self) -> SessionTicket {
        let state = self.read();
        SessionTicket {
            identity: state.identity.clone(),
            generation: state.generation,
        }
    }

    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.read().generation == ticket.generation
    }

    /// Binds the session to `identity` and persists it. Logging in again, even
    /// as the same identity, starts a new generation.
    pub fn login(&self, identity: Identity) -> SessionTicket {
        let ticket = {
            let mut state = self.write();
            state.identity = Some(identity.clone());
            state.generation += 1;
            SessionTicket {
                identity: state.identity.clone(),
                generation: state.generation,
            }
        };
        self.storage.put(IDENTITY_KEY, identity.as_str());
        info!(identity = %identity, generation = ticket.generation, "Logged in");
        ticket
    }

    /// Returns the session to anonymous and forgets the persisted identity.
    /// Returns `false` when there was no session to end.
    pub fn logout(&self) -> bool {
        let previous = {
            let mut state = self.write();
            let previous = state.identity.take();
            if previous.is_some() {
                state.generation += 1;
            }
            previous
        };
        self.storage.remove(IDENTITY_KEY);
        match previous {
            Some(id) => {
                info!(identity = %id, "Logged out");
                true
            }
            None => {
                debug!("Logout without an active session");
                false
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
