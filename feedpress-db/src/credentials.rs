//! Destination-scoped database credential resolution.
//!
//! Credentials live in a plain-text store of repeating blocks:
//!
//! ```text
//! Domain: shop.example.com
//! Database: shop_example_com
//! Username: shop_user
//! Password: hunter2
//! ```
//!
//! A domain-specific store (`{data_dir}/{domain}_database_credentials.conf`)
//! is consulted first, then the legacy store in the working directory. The
//! store is parsed once per run; lookups are against the resulting map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;

/// Legacy single-store filename, resolved against the working directory.
pub const LEGACY_STORE: &str = "database_credentials.conf";

/// Connection credentials for one destination's database.
///
/// Loaded once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Default)]
struct PartialCredentials {
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

impl PartialCredentials {
    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "Database" => &mut self.database,
            "Username" => &mut self.user,
            "Password" => &mut self.password,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    /// A block is usable only when all three keys were present.
    fn complete(self) -> Option<Credentials> {
        Some(Credentials {
            database: self.database?,
            user: self.user?,
            password: self.password?,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        })
    }
}

/// A parsed credential store: one block per `Domain:` marker, plus a legacy
/// (unscoped) block for key lines that precede any marker.
#[derive(Debug, Default)]
pub struct CredentialStore {
    domains: HashMap<String, Credentials>,
    legacy: Option<Credentials>,
}

impl CredentialStore {
    /// Parse store content. Unknown lines are ignored; a block ends at the
    /// next `Domain:` marker or end of input.
    pub fn parse(content: &str) -> Self {
        let mut store = Self::default();
        let mut current_domain: Option<String> = None;
        let mut block = PartialCredentials::default();

        let flush =
            |domain: Option<String>, block: PartialCredentials, store: &mut Self| {
                let Some(creds) = block.complete() else {
                    if let Some(d) = domain {
                        log::warn!("incomplete credential block for domain \"{}\"", d);
                    }
                    return;
                };
                match domain {
                    Some(d) => {
                        store.domains.insert(d, creds);
                    }
                    None => store.legacy = Some(creds),
                }
            };

        for line in content.lines() {
            let line = line.trim();
            if let Some(domain) = line.strip_prefix("Domain:") {
                flush(current_domain.take(), std::mem::take(&mut block), &mut store);
                current_domain = Some(domain.trim().to_string());
            } else if let Some((key, value)) = line.split_once(':') {
                block.set(key.trim(), value.trim());
            }
        }
        flush(current_domain, block, &mut store);

        store
    }

    /// Look up credentials for a domain, falling back to the legacy block.
    pub fn get(&self, domain: &str) -> Option<&Credentials> {
        self.domains.get(domain).or(self.legacy.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.legacy.is_none()
    }
}

/// Candidate store paths for a domain, in resolution order.
pub fn store_paths(data_dir: &Path, domain: &str) -> [PathBuf; 2] {
    [
        data_dir.join(format!("{}_database_credentials.conf", domain)),
        PathBuf::from(LEGACY_STORE),
    ]
}

/// Resolve credentials for a destination domain.
///
/// The first store file that exists is parsed and consulted. `None` means
/// synchronization is to be skipped; it is not an error.
pub fn resolve_credentials(data_dir: &Path, domain: &str) -> Option<Credentials> {
    for path in store_paths(data_dir, domain) {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                log::warn!("failed to read credential store {}: {}", path.display(), e);
                continue;
            }
        };

        let store = CredentialStore::parse(&content);
        match store.get(domain) {
            Some(creds) => {
                log::info!("using credentials from {}", path.display());
                return Some(creds.clone());
            }
            None => {
                log::warn!(
                    "credential store {} has no block for domain \"{}\"",
                    path.display(),
                    domain
                );
                return None;
            }
        }
    }

    log::info!("no credential store found for domain \"{}\"", domain);
    None
}
