//! In-memory mirror of the active identity's remote ledger.

use crate::core::identity::Identity;
use crate::core::session::{SessionStore, SessionTicket};
use crate::core::transaction::{NewTransaction, Transaction, TransactionDraft};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// Message shown to the user when a write is rejected.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save transaction";
pub const NO_SESSION_MESSAGE: &str = "Log in before recording a transaction";

/// Remote collection holding every identity's transactions.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// Returns the records owned by `owner`, in the store's order.
    async fn fetch(&self, owner: &Identity) -> Result<Vec<Transaction>>;

    /// Persists `record` and returns the stored copy with its assigned id.
    async fn create(&self, record: &NewTransaction) -> Result<Transaction>;
}

/// Result of a [`LedgerSync::reload`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(Vec<Transaction>),
    /// No session, or the remote holds no records for it.
    Empty,
    Failed(String),
    /// The session changed while the request was in flight; nothing was applied.
    Superseded,
}

/// Last applied reload outcome, as seen by views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loaded,
    Empty,
    Failed(String),
}

#[derive(Debug, Default)]
struct LedgerState {
    transactions: Vec<Transaction>,
    error_message: Option<String>,
    status: LoadStatus,
}

pub struct LedgerSync {
    backend: Arc<dyn LedgerBackend>,
    session: Arc<SessionStore>,
    state: RwLock<LedgerState>,
}

impl LedgerSync {
    pub fn new(backend: Arc<dyn LedgerBackend>, session: Arc<SessionStore>) -> Self {
        LedgerSync {
            backend,
            session,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Transactions of the active identity, in ledger order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.read().transactions.clone()
    }

    pub fn len(&self) -> usize {
        self.read().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().transactions.is_empty()
    }

    pub fn error_message(&self) -> Option<String> {
        self.read().error_message.clone()
    }

    pub fn load_status(&self) -> LoadStatus {
        self.read().status.clone()
    }

    /// Drops every cached transaction and forgets the last load.
    pub fn clear(&self) {
        let mut state = self.write();
        state.transactions.clear();
        state.status = LoadStatus::NotLoaded;
        debug!("Ledger cleared");
    }

    /// Replaces the collection with the remote records of the current session.
    pub async fn reload(&self) -> LoadOutcome {
        let ticket = self.session.ticket();
        let Some(owner) = ticket.identity.clone() else {
            let mut state = self.write();
            state.transactions.clear();
            state.status = LoadStatus::Empty;
            debug!("No active session, ledger left empty");
            return LoadOutcome::Empty;
        };

        debug!(identity = %owner, generation = ticket.generation, "Reloading ledger");
        let fetched = self.backend.fetch(&owner).await;

        let mut state = self.write();
        if !self.session.is_current(&ticket) {
            debug!(identity = %owner, "Session changed during reload, discarding result");
            return LoadOutcome::Superseded;
        }

        match fetched {
            Ok(records) => {
                let total = records.len();
                let records: Vec<Transaction> = records
                    .into_iter()
                    .filter(|tx| tx.user_id == owner)
                    .collect();
                if records.len() != total {
                    warn!(
                        identity = %owner,
                        dropped = total - records.len(),
                        "Remote returned records owned by another identity"
                    );
                }
                info!(identity = %owner, count = records.len(), "Ledger loaded");
                state.transactions = records.clone();
                if records.is_empty() {
                    state.status = LoadStatus::Empty;
                    LoadOutcome::Empty
                } else {
                    state.status = LoadStatus::Loaded;
                    LoadOutcome::Loaded(records)
                }
            }
            Err(e) => {
                error!(identity = %owner, "Failed to load transactions: {e:#}");
                let reason = format!("{e:#}");
                state.transactions.clear();
                state.status = LoadStatus::Failed(reason.clone());
                LoadOutcome::Failed(reason)
            }
        }
    }

    /// Persists `draft` for the active identity and appends the stored echo.
    ///
    /// Nothing is appended until the remote store confirms the write. On
    /// failure the collection is unchanged and [`Self::error_message`] is set.
    pub async fn add_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        let ticket = self.session.ticket();
        self.write().error_message = None;

        let Some(owner) = ticket.identity.clone() else {
            self.write().error_message = Some(NO_SESSION_MESSAGE.to_string());
            return Err(anyhow!(NO_SESSION_MESSAGE));
        };

        let record = draft.owned_by(&owner);
        debug!(identity = %owner, asset = %record.asset, side = %record.side, "Saving transaction");

        let saved = self
            .backend
            .create(&record)
            .await
            .and_then(|echo| validate_echo(echo, &owner));

        match saved {
            Ok(echo) => {
                self.append(&ticket, &echo);
                Ok(echo)
            }
            Err(e) => {
                error!(identity = %owner, "Failed to save transaction: {e:#}");
                if self.session.is_current(&ticket) {
                    self.write().error_message = Some(SAVE_FAILED_MESSAGE.to_string());
                }
                Err(e.context(SAVE_FAILED_MESSAGE))
            }
        }
    }

    fn append(&self, ticket: &SessionTicket, echo: &Transaction) {
        let mut state = self.write();
        if !self.session.is_current(ticket) {
            debug!(id = %echo.id, "Session changed during save, not appending");
            return;
        }
        state.transactions.push(echo.clone());
        info!(id = %echo.id, count = state.transactions.len(), "Transaction saved");
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_echo(echo: Transaction, owner: &Identity) -> Result<Transaction> {
    if echo.id.trim().is_empty() {
        return Err(anyhow!("Ledger returned a record without an identifier"));
    }
    if &echo.user_id != owner {
        return Err(anyhow!(
            "Ledger returned a record owned by {} instead of {}",
            echo.user_id,
            owner
        ));
    }
    Ok(echo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Side;
    use crate::store::memory::MemoryStore;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct MockLedger {
        records: Mutex<HashMap<String, Vec<Transaction>>>,
        fail_reads: bool,
        fail_writes: bool,
        blank_ids: bool,
        write_delay: Duration,
        next_id: AtomicUsize,
    }

    impl MockLedger {
        fn with(owner: &str, count: usize) -> Self {
            let ledger = MockLedger::default();
            let rows = (0..count).map(|i| tx(&format!("{owner}-{i}"), owner)).collect();
            ledger.records.lock().unwrap().insert(owner.to_string(), rows);
            ledger
        }
    }

    #[async_trait]
    impl LedgerBackend for MockLedger {
        async fn fetch(&self, owner: &Identity) -> Result<Vec<Transaction>> {
            if self.fail_reads {
                return Err(anyhow!("connection refused"));
            }
            let records = self.records.lock().unwrap();
            Ok(records.get(owner.as_str()).cloned().unwrap_or_default())
        }

        async fn create(&self, record: &NewTransaction) -> Result<Transaction> {
            tokio::time::sleep(self.write_delay).await;
            if self.fail_writes {
                return Err(anyhow!("HTTP error: 500"));
            }
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(Transaction {
                id: if self.blank_ids { String::new() } else { format!("new{n}") },
                user_id: record.user_id.clone(),
                asset: record.asset.clone(),
                side: record.side,
                quantity: record.quantity,
                price: record.price,
                timestamp: record.timestamp,
            })
        }
    }

    fn tx(id: &str, owner: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: Identity::new(owner).unwrap(),
            asset: "BTC".to_string(),
            side: Side::Buy,
            quantity: Decimal::ONE,
            price: Decimal::from(100),
            timestamp: Utc::now(),
        }
    }

    fn draft() -> TransactionDraft {
        TransactionDraft::new("btc", Side::Buy, Decimal::ONE, Decimal::from(50000))
    }

    fn setup(backend: MockLedger) -> (Arc<SessionStore>, LedgerSync) {
        let session = Arc::new(SessionStore::restore(Arc::new(MemoryStore::new())));
        let ledger = LedgerSync::new(Arc::new(backend), session.clone());
        (session, ledger)
    }

    #[tokio::test]
    async fn test_reload_without_session_is_empty() {
        let (_, ledger) = setup(MockLedger::with("user42", 2));
        assert_eq!(ledger.reload().await, LoadOutcome::Empty);
        assert!(ledger.is_empty());
        assert_eq!(ledger.load_status(), LoadStatus::Empty);
    }

    #[tokio::test]
    async fn test_reload_loads_records_in_remote_order() {
        let (session, ledger) = setup(MockLedger::with("user42", 3));
        session.login(Identity::new("user42").unwrap());

        let outcome = ledger.reload().await;

        let ids: Vec<_> = ledger.transactions().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["user42-0", "user42-1", "user42-2"]);
        assert!(matches!(outcome, LoadOutcome::Loaded(rows) if rows.len() == 3));
        assert_eq!(ledger.load_status(), LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn test_reload_drops_foreign_records() {
        let backend = MockLedger::with("user42", 1);
        backend
            .records
            .lock()
            .unwrap()
            .get_mut("user42")
            .unwrap()
            .push(tx("intruder", "mallory"));
        let (session, ledger) = setup(backend);
        session.login(Identity::new("user42").unwrap());

        ledger.reload().await;

        assert_eq!(ledger.len(), 1);
        assert!(ledger.transactions().iter().all(|t| t.user_id.as_str() == "user42"));
    }

    #[tokio::test]
    async fn test_reload_failure_clears_and_reports() {
        let backend = MockLedger {
            fail_reads: true,
            ..MockLedger::default()
        };
        let (session, ledger) = setup(backend);
        session.login(Identity::new("user42").unwrap());

        let outcome = ledger.reload().await;

        assert!(matches!(outcome, LoadOutcome::Failed(ref reason) if reason.contains("connection refused")));
        assert!(ledger.is_empty());
        assert!(matches!(ledger.load_status(), LoadStatus::Failed(_)));
        // Read failures do not touch the write error indicator
        assert!(ledger.error_message().is_none());
    }

    #[tokio::test]
    async fn test_add_transaction_appends_echo() {
        let (session, ledger) = setup(MockLedger::with("user42", 2));
        session.login(Identity::new("user42").unwrap());
        ledger.reload().await;
        let before = ledger.transactions();

        let saved = ledger.add_transaction(draft()).await.unwrap();

        let after = ledger.transactions();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.last(), Some(&saved));
        assert_eq!(saved.id, "new0");
        assert_eq!(saved.user_id.as_str(), "user42");
        assert_eq!(saved.asset, "BTC");
        assert!(ledger.error_message().is_none());
    }

    #[tokio::test]
    async fn test_add_transaction_failure_sets_error() {
        let backend = MockLedger {
            fail_writes: true,
            ..MockLedger::with("user42", 2)
        };
        let (session, ledger) = setup(backend);
        session.login(Identity::new("user42").unwrap());
        ledger.reload().await;

        let result = ledger.add_transaction(draft()).await;

        assert!(result.is_err());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.error_message().as_deref(), Some(SAVE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_add_transaction_rejects_blank_id() {
        let backend = MockLedger {
            blank_ids: true,
            ..MockLedger::default()
        };
        let (session, ledger) = setup(backend);
        session.login(Identity::new("user42").unwrap());

        assert!(ledger.add_transaction(draft()).await.is_err());
        assert!(ledger.is_empty());
        assert_eq!(ledger.error_message().as_deref(), Some(SAVE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_add_transaction_without_session() {
        let (_, ledger) = setup(MockLedger::default());

        let err = ledger.add_transaction(draft()).await.unwrap_err();

        assert_eq!(err.to_string(), NO_SESSION_MESSAGE);
        assert!(ledger.is_empty());
        assert_eq!(ledger.error_message().as_deref(), Some(NO_SESSION_MESSAGE));
    }

    #[tokio::test]
    async fn test_error_message_overwritten_by_next_attempt() {
        let (session, ledger) = setup(MockLedger::default());

        assert!(ledger.add_transaction(draft()).await.is_err());
        assert!(ledger.error_message().is_some());

        session.login(Identity::new("user42").unwrap());
        ledger.add_transaction(draft()).await.unwrap();
        assert!(ledger.error_message().is_none());
    }

    async fn save_across_login(backend: MockLedger) -> (Result<Transaction>, Arc<LedgerSync>) {
        let (session, ledger) = setup(backend);
        let ledger = Arc::new(ledger);
        session.login(Identity::new("alice").unwrap());

        let pending = tokio::spawn({
            let ledger = Arc::clone(&ledger);
            async move { ledger.add_transaction(draft()).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.login(Identity::new("bob").unwrap());
        ledger.clear();
        ledger.reload().await;

        (pending.await.unwrap(), ledger)
    }

    #[tokio::test]
    async fn test_late_echo_not_appended_after_login_switch() {
        let backend = MockLedger {
            write_delay: Duration::from_millis(200),
            ..MockLedger::with("bob", 1)
        };

        let (saved, ledger) = save_across_login(backend).await;

        let saved = saved.unwrap();
        assert_eq!(saved.user_id.as_str(), "alice");
        let ids: Vec<_> = ledger.transactions().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["bob-0"]);
        assert!(ledger.error_message().is_none());
    }

    #[tokio::test]
    async fn test_late_save_failure_leaves_new_session_clean() {
        let backend = MockLedger {
            fail_writes: true,
            write_delay: Duration::from_millis(200),
            ..MockLedger::with("bob", 1)
        };

        let (saved, ledger) = save_across_login(backend).await;

        assert!(saved.is_err());
        assert_eq!(ledger.len(), 1);
        assert!(ledger.error_message().is_none());
    }
}
