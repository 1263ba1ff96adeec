//! Reference exchange listing used to tell public firms from private ones.
//!
//! The listing is a versioned JSON data file:
//!
//! ```json
//! { "version": "2024-06-30", "exchange": "NASDAQ", "symbols": ["AAPL", "MSFT"] }
//! ```
//!
//! Symbols must be upper-case, sorted and unique. A process loads the file at
//! most once via [`init_reference_listing`]; later calls return the listing
//! already installed. Picking up a newer file requires a restart.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::{DistressError, DistressResult};

static REFERENCE_LISTING: OnceLock<Arc<ExchangeListing>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeListing {
    pub version: String,
    pub exchange: String,
    pub symbols: Vec<String>,
}

impl ExchangeListing {
    pub fn new(
        version: impl Into<String>,
        exchange: impl Into<String>,
        symbols: Vec<String>,
    ) -> DistressResult<Self> {
        let listing = Self {
            version: version.into(),
            exchange: exchange.into(),
            symbols,
        };
        listing.validate()?;
        Ok(listing)
    }

    pub fn from_json_str(contents: &str) -> DistressResult<Self> {
        let listing: Self = serde_json::from_str(contents)?;
        listing.validate()?;
        Ok(listing)
    }

    pub fn load(path: impl AsRef<Path>) -> DistressResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let listing = Self::from_json_str(&contents)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            version = %listing.version,
            exchange = %listing.exchange,
            symbols = listing.symbols.len(),
            "loaded reference listing"
        );
        Ok(listing)
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, identifier: &str) -> bool {
        let key = identifier.trim().to_ascii_uppercase();
        self.symbols.binary_search(&key).is_ok()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn validate(&self) -> DistressResult<()> {
        if self.version.trim().is_empty() {
            return Err(DistressError::InvalidInput {
                field: "version".into(),
                reason: "Listing version must not be empty.".into(),
            });
        }
        for symbol in &self.symbols {
            if symbol.is_empty() || *symbol != symbol.trim().to_ascii_uppercase() {
                return Err(DistressError::InvalidInput {
                    field: "symbols".into(),
                    reason: format!("Symbol '{symbol}' must be trimmed upper-case."),
                });
            }
        }
        if let Some(pair) = self.symbols.windows(2).find(|w| w[0] >= w[1]) {
            return Err(DistressError::InvalidInput {
                field: "symbols".into(),
                reason: format!(
                    "Symbols must be sorted and unique ('{}' before '{}').",
                    pair[0], pair[1]
                ),
            });
        }
        Ok(())
    }
}

/// Install `listing` as the process-wide reference listing.
///
/// The first installation wins; the listing in effect is returned.
pub fn install_reference_listing(listing: ExchangeListing) -> Arc<ExchangeListing> {
    let version = listing.version.clone();
    let mut installed = false;
    let current = REFERENCE_LISTING.get_or_init(|| {
        installed = true;
        Arc::new(listing)
    });
    if !installed {
        tracing::warn!(
            rejected = %version,
            current = %current.version,
            "reference listing already installed; ignoring"
        );
    }
    current.clone()
}

/// Load the listing at `path` unless one is already installed.
pub fn init_reference_listing(path: impl AsRef<Path>) -> DistressResult<Arc<ExchangeListing>> {
    if let Some(existing) = REFERENCE_LISTING.get() {
        return Ok(existing.clone());
    }
    let listing = ExchangeListing::load(path)?;
    Ok(install_reference_listing(listing))
}

pub fn reference_listing() -> Option<Arc<ExchangeListing>> {
    REFERENCE_LISTING.get().cloned()
}
