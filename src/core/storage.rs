//! Durable key-value storage for session state.

/// Synchronous string storage. Implementations log their own failures and
/// report absent values instead of errors.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
