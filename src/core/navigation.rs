//! Named views and the guard deciding who may enter them.

use crate::core::identity::Identity;
use crate::core::ledger::{LedgerSync, LoadOutcome};
use crate::core::session::SessionStore;
use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Trade,
    History,
    Analysis,
}

impl View {
    /// Where unauthenticated visitors are sent.
    pub const ENTRY: View = View::Login;

    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/",
            View::Trade => "/trade",
            View::History => "/history",
            View::Analysis => "/analysis",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, View::Login)
    }
}

impl Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches('/') {
            "" => Ok(View::Login),
            "/trade" => Ok(View::Trade),
            "/history" => Ok(View::History),
            "/analysis" => Ok(View::Analysis),
            _ => Err(anyhow!("Unknown view: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed(View),
    Redirect(View),
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Navigation::Proceed(_))
    }

    pub fn view(&self) -> View {
        match self {
            Navigation::Proceed(view) | Navigation::Redirect(view) => *view,
        }
    }
}

/// One navigation attempt: the access decision plus the ledger refresh it dispatched.
pub struct NavigationAttempt {
    pub decision: Navigation,
    pub refresh: JoinHandle<LoadOutcome>,
}

pub struct NavigationGuard {
    session: Arc<SessionStore>,
    ledger: Arc<LedgerSync>,
}

impl NavigationGuard {
    pub fn new(session: Arc<SessionStore>, ledger: Arc<LedgerSync>) -> Self {
        NavigationGuard { session, ledger }
    }

    /// Access predicate: protected views need an identity.
    pub fn authorize(destination: View, identity: Option<&Identity>) -> Navigation {
        if destination.requires_auth() && identity.is_none() {
            Navigation::Redirect(View::ENTRY)
        } else {
            Navigation::Proceed(destination)
        }
    }

    /// Decides on `destination` from the identity held right now.
    pub fn check(&self, destination: View) -> Navigation {
        let identity = self.session.identity();
        let decision = Self::authorize(destination, identity.as_ref());
        match (&decision, &identity) {
            (Navigation::Redirect(_), _) => {
                warn!(view = %destination, "Access denied, redirecting to login")
            }
            (Navigation::Proceed(_), Some(id)) => {
                debug!(view = %destination, identity = %id, "Navigation allowed")
            }
            (Navigation::Proceed(_), None) => debug!(view = %destination, "Navigation allowed"),
        }
        decision
    }

    /// Reloads the ledger for the current session in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn refresh(&self) -> JoinHandle<LoadOutcome> {
        let ledger = Arc::clone(&self.ledger);
        tokio::spawn(async move { ledger.reload().await })
    }

    /// Runs one navigation attempt: decide first, then refresh regardless of
    /// the decision.
    pub fn navigate(&self, destination: View) -> NavigationAttempt {
        let decision = self.check(destination);
        let refresh = self.refresh();
        NavigationAttempt { decision, refresh }
    }
}
