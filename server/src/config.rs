//! Startup configuration read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::store::{MemoryStore, SharedStore, SqliteStore, StoreError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which `TodoStore` backs the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub store: StoreKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            store: StoreKind::Memory,
        }
    }
}

impl Config {
    /// `TODO_BIND`, `TODO_PORT`, `TODO_STORE` (`memory` | `sqlite`) and
    /// `TODO_DB_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let ip = match lookup("TODO_BIND") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "TODO_BIND",
                value,
            })?,
            None => defaults.addr.ip(),
        };
        let port = match lookup("TODO_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "TODO_PORT",
                value,
            })?,
            None => defaults.addr.port(),
        };

        let store = match lookup("TODO_STORE").as_deref() {
            None | Some("memory") => StoreKind::Memory,
            Some("sqlite") => StoreKind::Sqlite(
                lookup("TODO_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("todos.db")),
            ),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "TODO_STORE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            store,
        })
    }

    pub fn open_store(&self) -> Result<SharedStore, ConfigError> {
        let store: SharedStore = match &self.store {
            StoreKind::Memory => {
                tracing::warn!("using in-memory store; todos are lost on restart");
                std::sync::Arc::new(MemoryStore::new())
            }
            StoreKind::Sqlite(path) => {
                tracing::info!(path = %path.display(), "opening sqlite store");
                std::sync::Arc::new(SqliteStore::open(path)?)
            }
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&'static str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<_, _> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_to_memory_on_localhost_3000() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn sqlite_store_uses_db_path() {
        let cfg = config(&[("TODO_STORE", "sqlite"), ("TODO_DB_PATH", "/tmp/t.db")]).unwrap();
        assert_eq!(cfg.store, StoreKind::Sqlite(PathBuf::from("/tmp/t.db")));

        let cfg = config(&[("TODO_STORE", "sqlite")]).unwrap();
        assert_eq!(cfg.store, StoreKind::Sqlite(PathBuf::from("todos.db")));
    }

    #[test]
    fn bind_and_port_override_defaults() {
        let cfg = config(&[("TODO_BIND", "0.0.0.0"), ("TODO_PORT", "8080")]).unwrap();
        assert_eq!(cfg.addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn rejects_unknown_store_and_bad_port() {
        assert!(matches!(
            config(&[("TODO_STORE", "postgres")]),
            Err(ConfigError::Invalid { var: "TODO_STORE", .. })
        ));
        assert!(matches!(
            config(&[("TODO_PORT", "http")]),
            Err(ConfigError::Invalid { var: "TODO_PORT", .. })
        ));
    }
}
