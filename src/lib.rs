//! Daydash: a personal dashboard with a clock, AI weather and a daily spending ledger.
//!
//! The binary exposes one-shot subcommands and an interactive terminal dashboard. The library
//! holds everything behind them so that it can be driven and tested without a terminal.

pub mod api;
pub mod args;
mod backup;
pub mod clock;
pub mod commands;
pub mod commentary;
mod config;
pub mod dashboard;
mod error;
pub mod ledger;
pub mod model;
pub mod shortcuts;
pub mod store;
mod utils;
pub mod view;
pub mod weather;


pub use api::Mode;
pub use backup::Backup;
pub use config::Config;
pub use error::Error;
pub use error::Result;
