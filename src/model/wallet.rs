use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Ordered set of wallet address strings.
///
/// Insertion keeps first-seen order and drops exact duplicates. Matching is
/// case-sensitive: `0xAbC..` and `0xabc..` are two entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletSet {
    addresses: Vec<String>,
}

impl WalletSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one address. Returns `false` if it was already present.
    pub fn insert(&mut self, address: impl Into<String>) -> bool {
        let address = address.into();
        if self.contains(&address) {
            return false;
        }
        self.addresses.push(address);
        true
    }

    /// Add many addresses, returning how many were new.
    pub fn extend<I, S>(&mut self, addresses: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for address in addresses {
            if self.insert(address) {
                added += 1;
            }
        }
        added
    }

    /// Remove an address. Returns `false` if it was not present.
    pub fn remove(&mut self, address: &str) -> bool {
        let before = self.addresses.len();
        self.addresses.retain(|a| a != address);
        self.addresses.len() != before
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.iter().any(|a| a == address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.addresses
    }

    /// Read a wallet list file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading wallet list {}", path.display()))?;
        Ok(Self::parse_list(&contents))
    }

    /// One address per line; blank lines and `#` comments are ignored and
    /// surrounding whitespace is trimmed.
    pub fn parse_list(contents: &str) -> Self {
        contents
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl<'a> FromIterator<&'a str> for WalletSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut set = WalletSet::new();
        set.extend(iter);
        set
    }
}
