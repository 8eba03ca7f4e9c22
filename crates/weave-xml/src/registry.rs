//! Identity table for constants without a textual form.

use rhizome_weave_ir::Opaque;
use std::collections::HashMap;
use tracing::trace;

/// Maps opaque constant payloads to per-session keys.
///
/// Keys are assigned in registration order starting at 1, and the same
/// object (by identity) always gets the same key. The registry holds a clone
/// of every registered object, so addresses stay unique while it is alive.
///
/// Keys mean nothing outside the registry that produced them: a document
/// carrying opaque constants only decodes against that same registry.
#[derive(Debug, Clone, Default)]
pub struct ConstantRegistry {
    next: u64,
    keys: HashMap<usize, u64>,
    objects: HashMap<u64, Opaque>,
}

impl ConstantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for `value`, registering it on first sight.
    pub fn register(&mut self, value: &Opaque) -> u64 {
        if let Some(&key) = self.keys.get(&value.addr()) {
            return key;
        }

        self.next += 1;
        let key = self.next;
        self.keys.insert(value.addr(), key);
        self.objects.insert(key, value.clone());
        trace!(key, "registered opaque constant");
        key
    }

    pub fn get(&self, key: u64) -> Option<&Opaque> {
        self.objects.get(&key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
