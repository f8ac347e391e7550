/*!
 * Named Environments
 * Registry of variable tables, exactly one of which is selected at a time
 *
 * The selected environment is published on a watch channel so background
 * watchers follow `select` without holding a reference to the registry.
 */

use super::vars::EnvVars;
use crate::core::errors::{EnvError, EnvResult};
use crate::core::limits::GLOBAL_ENV;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tokio::sync::watch;
use tracing::info;

/// The selected environment as published to watchers
#[derive(Debug, Clone)]
pub struct ActiveEnv {
    pub name: String,
    pub vars: EnvVars,
}

pub struct Environments {
    envs: RwLock<BTreeMap<String, EnvVars>>,
    active: watch::Sender<ActiveEnv>,
}

impl Environments {
    /// Registry holding only the global environment, selected
    pub fn new() -> Self {
        let global = EnvVars::new();
        let mut envs = BTreeMap::new();
        envs.insert(GLOBAL_ENV.to_string(), global.clone());
        let (active, _) = watch::channel(ActiveEnv {
            name: GLOBAL_ENV.to_string(),
            vars: global,
        });
        Self {
            envs: RwLock::new(envs),
            active,
        }
    }

    /// Variables of the selected environment
    pub fn current(&self) -> EnvVars {
        self.active.borrow().vars.clone()
    }

    pub fn current_name(&self) -> String {
        self.active.borrow().name.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ActiveEnv> {
        self.active.subscribe()
    }

    /// Sorted environment names
    pub fn names(&self) -> Vec<String> {
        self.envs.read().keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> EnvResult<EnvVars> {
        self.envs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::NotFound(name.to_string()))
    }

    pub fn create(&self, name: &str) -> EnvResult<()> {
        validate_name(name)?;
        let mut envs = self.envs.write();
        if envs.contains_key(name) {
            return Err(EnvError::AlreadyExists(name.to_string()));
        }
        envs.insert(name.to_string(), EnvVars::new());
        info!(env = %name, "Environment created");
        Ok(())
    }

    pub fn select(&self, name: &str) -> EnvResult<()> {
        // Registry lock held while publishing so a concurrent delete can't
        // remove the environment being selected
        let envs = self.envs.read();
        let vars = envs
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::NotFound(name.to_string()))?;
        self.active.send_replace(ActiveEnv {
            name: name.to_string(),
            vars,
        });
        info!(env = %name, "Environment selected");
        Ok(())
    }

    /// Delete an environment that is neither global nor selected
    pub fn delete(&self, name: &str) -> EnvResult<()> {
        if name == GLOBAL_ENV {
            return Err(EnvError::Global);
        }
        let mut envs = self.envs.write();
        if !envs.contains_key(name) {
            return Err(EnvError::NotFound(name.to_string()));
        }
        if self.active.borrow().name == name {
            return Err(EnvError::Selected(name.to_string()));
        }
        envs.remove(name);
        info!(env = %name, "Environment deleted");
        Ok(())
    }
}

impl Default for Environments {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> EnvResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(EnvError::InvalidName(name.to_string()))
    }
}
