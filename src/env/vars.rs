/*!
 * Environment Variables
 * Shared variable table of the active shell environment
 */

use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

// Fixed seeds keep fingerprints comparable for the life of the process
const FINGERPRINT_SEEDS: [u64; 4] = [
    0x6b75_6265_642d_7368,
    0x656e_7669_726f_6e6d,
    0x656e_7466_696e_6765,
    0x7270_7269_6e74_0001,
];

#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: Arc<RwLock<BTreeMap<String, String>>>,
}

impl EnvVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.vars.write().remove(key)
    }

    /// Sorted copy of every variable
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.vars
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.read().is_empty()
    }

    /// Content hash of the whole variable set
    pub fn fingerprint(&self) -> u64 {
        let [a, b, c, d] = FINGERPRINT_SEEDS;
        let mut hasher = RandomState::with_seeds(a, b, c, d).build_hasher();
        let vars = self.vars.read();
        vars.len().hash(&mut hasher);
        for (k, v) in vars.iter() {
            k.hash(&mut hasher);
            v.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Resolve `$NAME` to its value; anything else is returned as is
    pub fn interpolate(&self, word: &str) -> String {
        match word.strip_prefix('$') {
            Some(name) if !name.is_empty() => self.get(name).unwrap_or_default(),
            _ => word.to_string(),
        }
    }
}

/// Parse `NAME=value`; names are identifiers, values may be empty
pub fn parse_assignment(line: &str) -> Option<(String, String)> {
    let (name, value) = line.trim().split_once('=')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid || value.contains(char::is_whitespace) {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}
