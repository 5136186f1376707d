use crate::core::identity::Identity;
use crate::core::ledger::{LedgerBackend, LedgerSync, LoadOutcome};
use crate::core::navigation::NavigationGuard;
use crate::core::quote::{QuoteProvider, QuoteSet};
use crate::core::session::SessionStore;
use crate::core::storage::KeyValueStore;
use std::sync::Arc;
use tracing::debug;

/// The application state shared by every view: session, ledger and price feed.
///
/// Built once at startup and handed out by reference; dropping it tears the
/// state down.
pub struct Wallet {
    session: Arc<SessionStore>,
    ledger: Arc<LedgerSync>,
    quotes: Arc<dyn QuoteProvider>,
}

impl Wallet {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        backend: Arc<dyn LedgerBackend>,
        quotes: Arc<dyn QuoteProvider>,
    ) -> Self {
        let session = Arc::new(SessionStore::restore(storage));
        let ledger = Arc::new(LedgerSync::new(backend, Arc::clone(&session)));
        Wallet {
            session,
            ledger,
            quotes,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn ledger(&self) -> &LedgerSync {
        &self.ledger
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    /// Switches to `identity` and loads its ledger. Records of any previous
    /// identity are dropped before the new ones are requested.
    pub async fn login(&self, identity: Identity) -> LoadOutcome {
        self.session.login(identity);
        self.ledger.clear();
        self.ledger.reload().await
    }

    pub fn logout(&self) {
        self.session.logout();
        self.ledger.clear();
    }

    pub async fn quotes(&self) -> QuoteSet {
        let quotes = self.quotes.fetch_quotes().await;
        debug!(count = quotes.len(), "Quotes refreshed");
        quotes
    }

    pub fn guard(&self) -> NavigationGuard {
        NavigationGuard::new(Arc::clone(&self.session), Arc::clone(&self.ledger))
    }
}
