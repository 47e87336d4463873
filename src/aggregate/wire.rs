//! Textual exchange format for [`DecodeResponse`]
//!
//! Keys are emitted in a fixed order: `resultsCount`, then either the
//! promoted entry fields or `results`. Reserved fields always win over
//! auxiliary keys of the same name; colliding auxiliary keys are left out
//! of the output (they stay in [`ResultEntry::extra`]).

use std::collections::BTreeMap;

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

use super::{DecodeResponse, ResultEntry};
use crate::error::{Error, Result};

const RESULTS_COUNT: &str = "resultsCount";
const RESULTS: &str = "results";
const BARCODE_TYPE_NAME: &str = "barcodeTypeName";
const TEXTUAL_DATA: &str = "textualData";
const CHARACTER_SET: &str = "characterSet";

/// Top-level names auxiliary fields can never overwrite
pub const RESERVED_FIELDS: [&str; 5] = [
    RESULTS_COUNT,
    RESULTS,
    BARCODE_TYPE_NAME,
    TEXTUAL_DATA,
    CHARACTER_SET,
];

fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

fn serialize_entry_fields<M: SerializeMap>(entry: &ResultEntry, map: &mut M) -> std::result::Result<(), M::Error> {
    map.serialize_entry(BARCODE_TYPE_NAME, &entry.barcode_type_name)?;
    map.serialize_entry(TEXTUAL_DATA, &entry.textual_data)?;
    if !entry.character_set.is_empty() {
        map.serialize_entry(CHARACTER_SET, &entry.character_set)?;
    }
    for (key, value) in &entry.extra {
        if is_reserved(key) {
            warn!(key = key.as_str(), "auxiliary field shadows a reserved response field, skipped");
            continue;
        }
        map.serialize_entry(key, value)?;
    }
    Ok(())
}

struct EntryObject<'a>(&'a ResultEntry);

impl Serialize for EntryObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        serialize_entry_fields(self.0, &mut map)?;
        map.end()
    }
}

struct EntryList<'a>(&'a [ResultEntry]);

impl Serialize for EntryList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for entry in self.0 {
            seq.serialize_element(&EntryObject(entry))?;
        }
        seq.end()
    }
}

impl Serialize for DecodeResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Some(reason) = self.shape_violation() {
            return Err(S::Error::custom(reason));
        }
        let mut map = serializer.serialize_map(None)?;
        match self {
            DecodeResponse::Empty => {
                map.serialize_entry(RESULTS_COUNT, &0)?;
                map.serialize_entry(BARCODE_TYPE_NAME, "")?;
                map.serialize_entry(TEXTUAL_DATA, "")?;
            }
            DecodeResponse::Single(entry) => {
                map.serialize_entry(RESULTS_COUNT, &1)?;
                serialize_entry_fields(entry, &mut map)?;
            }
            DecodeResponse::Multiple(entries) => {
                map.serialize_entry(RESULTS_COUNT, &entries.len())?;
                map.serialize_entry(RESULTS, &EntryList(entries))?;
            }
        }
        map.end()
    }
}

impl DecodeResponse {
    /// A multi-result response must carry at least two entries
    fn shape_violation(&self) -> Option<String> {
        match self {
            DecodeResponse::Multiple(entries) if entries.len() < 2 => Some(format!(
                "multi-result response needs at least 2 entries, got {}",
                entries.len()
            )),
            _ => None,
        }
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Result<String> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::serialization(
            key,
            format!("expected a string, found {}", other),
        )),
        None => Err(Error::serialization(key, "missing")),
    }
}

fn parse_entry(object: &Map<String, Value>, skip: &[&str]) -> Result<ResultEntry> {
    let barcode_type_name = string_field(object, BARCODE_TYPE_NAME)?;
    let textual_data = string_field(object, TEXTUAL_DATA)?;
    let character_set = match object.get(CHARACTER_SET) {
        Some(_) => string_field(object, CHARACTER_SET)?,
        None => String::new(),
    };

    let mut extra = BTreeMap::new();
    for (key, value) in object {
        if skip.contains(&key.as_str()) || matches!(key.as_str(), BARCODE_TYPE_NAME | TEXTUAL_DATA | CHARACTER_SET) {
            continue;
        }
        if is_reserved(key) {
            return Err(Error::serialization(key, "reserved field not allowed here"));
        }
        match value {
            Value::String(s) => {
                extra.insert(key.clone(), s.clone());
            }
            other => {
                return Err(Error::serialization(
                    key,
                    format!("auxiliary values must be strings, found {}", other),
                ));
            }
        }
    }

    Ok(ResultEntry {
        barcode_type_name,
        textual_data,
        character_set,
        extra,
    })
}

impl TryFrom<Value> for DecodeResponse {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(Error::serialization("<root>", "expected a JSON object"));
        };
        let count = root
            .get(RESULTS_COUNT)
            .ok_or_else(|| Error::serialization(RESULTS_COUNT, "missing"))?
            .as_u64()
            .ok_or_else(|| Error::serialization(RESULTS_COUNT, "expected a non-negative integer"))?;

        match count {
            0 => {
                for key in [BARCODE_TYPE_NAME, TEXTUAL_DATA] {
                    if !string_field(&root, key)?.is_empty() {
                        return Err(Error::serialization(key, "must be empty when resultsCount is 0"));
                    }
                }
                if let Some(key) = root
                    .keys()
                    .find(|k| !matches!(k.as_str(), RESULTS_COUNT | BARCODE_TYPE_NAME | TEXTUAL_DATA))
                {
                    return Err(Error::serialization(key, "unexpected field in empty response"));
                }
                Ok(DecodeResponse::Empty)
            }
            1 => Ok(DecodeResponse::Single(parse_entry(&root, &[RESULTS_COUNT])?)),
            n => {
                let Some(Value::Array(items)) = root.get(RESULTS) else {
                    return Err(Error::serialization(RESULTS, "expected an array"));
                };
                if items.len() as u64 != n {
                    return Err(Error::serialization(
                        RESULTS_COUNT,
                        format!("says {} but results holds {}", n, items.len()),
                    ));
                }
                if let Some(key) = root.keys().find(|k| !matches!(k.as_str(), RESULTS_COUNT | RESULTS)) {
                    return Err(Error::serialization(key, "unexpected field in multi-result response"));
                }
                let entries = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Value::Object(object) => parse_entry(object, &[]),
                        _ => Err(Error::serialization(format!("results[{}]", i), "expected an object")),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(DecodeResponse::Multiple(entries))
            }
        }
    }
}

impl DecodeResponse {
    /// Compact wire text
    ///
    /// Fails when a `Multiple` holds fewer than two entries; use
    /// [`DecodeResponse::from_entries`] to pick the shape.
    pub fn to_json(&self) -> Result<String> {
        if let Some(reason) = self.shape_violation() {
            return Err(Error::serialization(RESULTS, reason));
        }
        serde_json::to_string(self).map_err(|e| Error::serialization("<response>", e.to_string()))
    }

    /// Indented wire text, for diagnostics
    pub fn to_json_pretty(&self) -> Result<String> {
        if let Some(reason) = self.shape_violation() {
            return Err(Error::serialization(RESULTS, reason));
        }
        serde_json::to_string_pretty(self).map_err(|e| Error::serialization("<response>", e.to_string()))
    }

    /// Parse any of the three wire shapes
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| Error::serialization("<root>", e.to_string()))?;
        Self::try_from(value)
    }
}
