//! Core state, domain types and the seams to remote services

pub mod config;
pub mod identity;
pub mod ledger;
pub mod log;
pub mod navigation;
pub mod portfolio;
pub mod quote;
pub mod session;
pub mod storage;
pub mod transaction;
pub mod wallet;

// Re-export main types for cleaner imports
pub use identity::Identity;
pub use ledger::{LedgerBackend, LedgerSync, LoadOutcome, LoadStatus};
pub use navigation::{Navigation, NavigationGuard, View};
pub use quote::{Asset, QuoteProvider, QuoteSet};
pub use session::SessionStore;
pub use transaction::{Side, Transaction, TransactionDraft};
pub use wallet::Wallet;
