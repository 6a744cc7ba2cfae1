//! In-memory favourites set, ordered by ticker.

use std::collections::BTreeSet;

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Favourites {
    tickers: BTreeSet<String>,
}

impl Favourites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_favourite(&self, ticker: &str) -> bool {
        self.tickers.contains(ticker)
    }

    /// Returns false if the ticker was already a favourite.
    pub fn add(&mut self, ticker: &str) -> bool {
        let added = self.tickers.insert(ticker.to_string());
        if added {
            debug!(ticker, "added to favourites");
        }
        added
    }

    /// Returns false if the ticker was not a favourite.
    pub fn remove(&mut self, ticker: &str) -> bool {
        let removed = self.tickers.remove(ticker);
        if removed {
            debug!(ticker, "removed from favourites");
        }
        removed
    }

    /// Flip membership. Returns the new membership.
    pub fn toggle(&mut self, ticker: &str) -> bool {
        if self.is_favourite(ticker) {
            self.remove(ticker);
            false
        } else {
            self.add(ticker);
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Favourites {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tickers: iter.into_iter().map(Into::into).collect(),
        }
    }
}
