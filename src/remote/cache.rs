// src/remote/cache.rs

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde_json::Value;

// Cache de respostas GET, compartilhado por todas as telas.
// Chave = identidade do token + caminho + query. Qualquer mutação bem sucedida limpa tudo.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// TTL zero desliga o cache.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        {
            let store = self.store.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            match store.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expirada: remove
        let mut store = self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        store.remove(key);
        None
    }

    pub fn insert(&self, key: String, value: Value) {
        if !self.is_enabled() {
            return;
        }
        let now = Instant::now();
        let entry = CacheEntry { value, expires_at: now + self.ttl };
        let mut store = self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Chaves por produto nem sempre são relidas: varre as expiradas a cada escrita.
        store.retain(|_, entry| entry.expires_at > now);
        store.insert(key, entry);
    }

    pub fn invalidate_all(&self) {
        let mut store = self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !store.is_empty() {
            tracing::debug!("Cache invalidado ({} entradas)", store.len());
            store.clear();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.store.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
