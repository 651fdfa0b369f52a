use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The operations commands are allowed to perform on the keyspace.
///
/// Each call is atomic with respect to every other call. Implementations decide how that is
/// achieved, so the locking strategy can change without touching the commands.
pub trait Storage: Send + Sync {
    /// Inserts `value` under `key`, replacing any previous value.
    fn set(&self, key: Bytes, value: Bytes);

    fn get(&self, key: &[u8]) -> Option<Bytes>;

    /// Removes every key in `keys` that is present and returns how many were removed.
    fn delete(&self, keys: &[Bytes]) -> usize;

    fn size(&self) -> usize;
}

/// The Store holds the keyspace shared by every connection. It is cheap to clone: all clones
/// point at the same map.
///
/// Reads share the lock, writes take it exclusively. No lock is ever held across an `.await`.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<HashMap<Bytes, Bytes>>>,
}

impl Store {
    pub fn new() -> Store {
        Self::default()
    }
}

impl Storage for Store {
    fn set(&self, key: Bytes, value: Bytes) {
        self.inner.write().insert(key, value);
    }

    fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.inner.read().get(key).cloned()
    }

    fn delete(&self, keys: &[Bytes]) -> usize {
        let mut keyspace = self.inner.write();
        let mut removed = 0;
        for key in keys {
            if keyspace.remove(key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    fn size(&self) -> usize {
        self.inner.read().len()
    }
}
