//! One company card in the main screen carousel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub ticker: String,
    pub name: String,
    pub sector: String,
}

impl Page {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            sector: sector.into(),
        }
    }
}
