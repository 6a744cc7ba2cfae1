//! AID core: framework-independent UI state for the stock tracker.
//!
//! This crate holds everything the screens compute, none of what they draw:
//! - Domain types (pages, time ranges, price points, indicators)
//! - Page carousel gesture state machine
//! - Per-ticker details session with range-keyed chart cache
//! - Chart pointer interaction (clamping, nearest point)
//! - Favourites set
//! - Market provider trait with a deterministic synthetic source
//! - TOML configuration

pub mod carousel;
pub mod chart;
pub mod config;
pub mod details;
pub mod domain;
pub mod favourites;
pub mod provider;

pub use carousel::{CarouselController, DragPhase, GesturePhase, SwipeDirection};
pub use config::{AppConfig, ConfigError};
pub use details::{DetailsSession, FetchCompletion, FetchRequest, LoadingState, SessionEvent};
pub use favourites::Favourites;
pub use provider::{MarketProvider, ProviderError, SyntheticProvider};
