//! sitestamp Core Library
//!
//! Configuration, error taxonomy, directory guards, content signatures, and
//! the timestamp ledger for the sitestamp site builder.

pub mod config;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod paths;
pub mod signature;

pub use config::{Config, SubsiteConfig};
pub use error::{CoreError, Result};
pub use ledger::{Resolution, TimestampLedger};
pub use signature::SignatureStrategy;
