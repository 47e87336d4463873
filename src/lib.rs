//! barcode_contract - configuration and result contract for a barcode engine
//!
//! The decoding itself happens in an external engine behind the
//! [`DecodingEngine`] trait. This crate owns what surrounds it:
//! - A typed [`ScanConfiguration`] with per-symbology settings
//! - Aggregation of engine records into a three-shape [`DecodeResponse`]
//! - The JSON wire format of that response
//! - A [`Session`] tying license activation, configuration and decoding together

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Decode-result aggregation and its wire format
pub mod aggregate;
/// Scan configuration model (global and per-symbology settings)
pub mod config;
mod env;
/// Error types
pub mod error;
/// Core data types (symbologies, engine records, frames)
pub mod models;
/// Engine seam and decoding session
pub mod session;

pub use aggregate::{DecodeResponse, RESERVED_FIELDS, ResultEntry, aggregate};
pub use config::{
    DecodingSpeed, Formatting, GlobalOptions, RegionOfInterest, ScanConfiguration, SpecificConfig,
    SpecificConfigPatch, SymbologyOptions,
};
pub use error::{EngineError, Error, Result};
pub use models::{DecodeRecord, GrayFrame, SymbologyFamily, SymbologyKind};
pub use session::{Activation, CancelToken, DecodeControl, DecodingEngine, Session, StopReason};
