use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::kv::{KeyValueStore, StorageError};

#[derive(Default)]
struct Inner {
    values: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// Volatile key-value store. Clones share the same map, so a test can keep a
/// handle after boxing one into the [`Store`](crate::store::Store). The
/// failure switches model disabled browser storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Raw value lookup that ignores the failure switches.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        if inner.fail_reads {
            return Err(StorageError::Unavailable);
        }
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StorageError::Unavailable);
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
