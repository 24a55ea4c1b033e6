//! # Wallet PnL Analytics
//!
//! This crate turns a wallet's transfer records into a profit-and-loss summary.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no file or network access. It depends only on `core-types`.
//! - **Stateless Calculation:** the `AnalyticsEngine` takes records as input and
//!   produces a `PnlReport` as output. Nothing is cached between calls.
//! - **Formatting is separate:** `render` turns a report into text for any
//!   [`render::Markup`], so transports decide how their own syntax is escaped.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the calculation logic.
//! - `PnlReport`, `DailyAggregate`, `DayPnl`: the report value.
//! - `AnalyticsError`: the errors that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod render;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use render::{Markup, PlainText, render_error, render_report};
pub use report::{DailyAggregate, DayPnl, PnlReport};
