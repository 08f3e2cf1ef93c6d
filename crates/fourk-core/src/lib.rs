//! fourk-core - Core library for fourk
//!
//! This crate contains the dealer models, the FourK API client, and the
//! file-status reconciliation used by the `fourk` command-line interface.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod reconcile;
pub mod summary;
pub mod transform;
pub mod util;

pub use error::{Error, Result};
pub use models::{Dealer, DealerFile, DealerStatus, FileSetting, FileStatus};
