//! Decode-result aggregation
//!
//! Turns the engine's ordered [`DecodeRecord`] sequence into the three-shape
//! [`DecodeResponse`] callers branch on:
//! - no symbols: count plus empty placeholder fields
//! - one symbol: its fields promoted to the top level
//! - several symbols: count plus an ordered `results` list
//!
//! The engine already enforces the caller's result limit, so nothing is
//! truncated or re-sorted here.

mod wire;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{DecodeRecord, SymbologyKind};

pub use wire::RESERVED_FIELDS;

/// One decoded symbol in textual form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultEntry {
    /// Human-readable symbology name (`"QR"`, `"Code 128"`, ...)
    pub barcode_type_name: String,
    /// Decoded payload
    pub textual_data: String,
    /// Character-set label; empty when unknown
    pub character_set: String,
    /// Symbology-specific auxiliary fields
    pub extra: BTreeMap<String, String>,
}

impl ResultEntry {
    /// Symbology resolved from the canonical type name
    pub fn symbology(&self) -> Option<SymbologyKind> {
        SymbologyKind::from_type_name(&self.barcode_type_name)
    }

    fn from_record(record: DecodeRecord) -> Result<Self> {
        let textual_data = utf8("textualData", record.text())?;
        let mut extra = BTreeMap::new();
        for (key, value) in record.extra() {
            extra.insert(key.clone(), utf8(key, value)?);
        }
        Ok(Self {
            barcode_type_name: record.type_name().to_string(),
            textual_data,
            character_set: record.character_set().to_string(),
            extra,
        })
    }
}

fn utf8(field: &str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        Error::serialization(
            field,
            format!("value is not valid UTF-8 (at byte {})", e.utf8_error().valid_up_to()),
        )
    })
}

/// Aggregated response of one decode call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DecodeResponse {
    /// Nothing found
    #[default]
    Empty,
    /// Exactly one symbol
    Single(ResultEntry),
    /// Two or more symbols, in engine emission order; fewer cannot be serialized
    Multiple(Vec<ResultEntry>),
}

impl DecodeResponse {
    /// Pick the shape matching the number of entries
    pub fn from_entries(mut entries: Vec<ResultEntry>) -> Self {
        match entries.len() {
            0 => DecodeResponse::Empty,
            1 => DecodeResponse::Single(entries.remove(0)),
            _ => DecodeResponse::Multiple(entries),
        }
    }

    /// Number of decoded symbols
    pub fn results_count(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing was decoded
    pub fn is_empty(&self) -> bool {
        self.results_count() == 0
    }

    /// All entries regardless of shape
    pub fn entries(&self) -> &[ResultEntry] {
        match self {
            DecodeResponse::Empty => &[],
            DecodeResponse::Single(entry) => std::slice::from_ref(entry),
            DecodeResponse::Multiple(entries) => entries,
        }
    }

    /// The first entry, if any
    pub fn first(&self) -> Option<&ResultEntry> {
        self.entries().first()
    }
}

/// Shape the engine's records into a [`DecodeResponse`]
///
/// Fails with a serialization error naming the field when a payload or
/// auxiliary value is not valid UTF-8.
pub fn aggregate(records: Vec<DecodeRecord>) -> Result<DecodeResponse> {
    let entries = records
        .into_iter()
        .map(ResultEntry::from_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(DecodeResponse::from_entries(entries))
}
