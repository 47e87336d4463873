use std::collections::BTreeMap;

use super::SymbologyKind;

/// One located and decoded symbol, as emitted by the decoding engine.
///
/// Payloads are raw bytes: the engine makes no UTF-8 promise, so textual
/// conversion happens in the aggregator where failures can name the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRecord {
    kind: SymbologyKind,
    type_name: String,
    text: Vec<u8>,
    character_set: String,
    extra: BTreeMap<String, Vec<u8>>,
}

impl DecodeRecord {
    /// Create a record with the kind's canonical type name and no extras
    pub fn new(kind: SymbologyKind, text: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            type_name: kind.type_name().to_string(),
            text: text.into(),
            character_set: String::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Override the human-readable type name reported by the engine
    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = name.into();
        self
    }

    /// Set the character-set label (e.g. `"ISO-8859-1"`)
    pub fn with_character_set(mut self, charset: impl Into<String>) -> Self {
        self.character_set = charset.into();
        self
    }

    /// Add a symbology-specific auxiliary field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Symbology of the decoded symbol
    pub fn kind(&self) -> SymbologyKind {
        self.kind
    }

    /// Human-readable type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Raw decoded payload
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Character-set label, empty when the engine did not report one
    pub fn character_set(&self) -> &str {
        &self.character_set
    }

    /// Auxiliary fields, ordered by key
    pub fn extra(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.extra
    }
}
