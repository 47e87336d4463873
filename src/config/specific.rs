//! Per-symbology parameter blocks
//!
//! A [`SpecificConfig`] carries the capability set every decoder shares
//! (enable flag, expected count, length bounds) plus a [`SymbologyOptions`]
//! variant holding only the fields meaningful to that symbology family.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::SymbologyKind;

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(_, v)| *v)
}

/// Generic on/off checksum mode (2-of-5 family, ID document master checksum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Checksum {
    /// Checksum not verified
    #[default]
    Disabled,
    /// Checksum verified and stripped
    Enabled,
}

impl Checksum {
    const NAMES: [(&'static str, Checksum); 2] =
        [("Disabled", Checksum::Disabled), ("Enabled", Checksum::Enabled)];

    /// Parse a checksum mode name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        lookup(&Self::NAMES, name)
    }
}

/// Code 11 check digit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Code11Checksum {
    /// No check digit
    #[default]
    Disabled,
    /// One check digit (C)
    Single,
    /// Two check digits (C and K)
    Double,
}

impl Code11Checksum {
    const NAMES: [(&'static str, Code11Checksum); 3] = [
        ("Disabled", Code11Checksum::Disabled),
        ("Single", Code11Checksum::Single),
        ("Double", Code11Checksum::Double),
    ];

    /// Parse a checksum mode name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        lookup(&Self::NAMES, name)
    }
}

/// Code 39 mod-43 check digit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Code39Checksum {
    /// No check digit
    #[default]
    Disabled,
    /// Mod-43 check digit verified
    Enabled,
}

impl Code39Checksum {
    const NAMES: [(&'static str, Code39Checksum); 2] = [
        ("Disabled", Code39Checksum::Disabled),
        ("Enabled", Code39Checksum::Enabled),
    ];

    /// Parse a checksum mode name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        lookup(&Self::NAMES, name)
    }
}

/// MSI Plessey check digit scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MsiChecksum {
    /// No check digit
    Disabled,
    /// Single mod-10
    #[default]
    Mod10,
    /// Single mod-11
    Mod11,
    /// Mod-10 followed by mod-10
    Mod1010,
    /// Mod-11 followed by mod-10
    Mod1110,
    /// Mod-11, IBM weighting
    Mod11IBM,
    /// Mod-11 (IBM weighting) followed by mod-10
    Mod1110IBM,
}

impl MsiChecksum {
    const NAMES: [(&'static str, MsiChecksum); 7] = [
        ("Disabled", MsiChecksum::Disabled),
        ("Mod10", MsiChecksum::Mod10),
        ("Mod11", MsiChecksum::Mod11),
        ("Mod1010", MsiChecksum::Mod1010),
        ("Mod1110", MsiChecksum::Mod1110),
        ("Mod11IBM", MsiChecksum::Mod11IBM),
        ("Mod1110IBM", MsiChecksum::Mod1110IBM),
    ];

    /// Parse a checksum scheme name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        lookup(&Self::NAMES, name)
    }
}

/// Family-specific fields of a [`SpecificConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all_fields = "camelCase")]
pub enum SymbologyOptions {
    /// No family-specific fields
    Plain,
    /// Code 11
    Code11 {
        /// Check digit mode
        checksum: Code11Checksum,
    },
    /// Code 39
    Code39 {
        /// Check digit mode
        checksum: Code39Checksum,
    },
    /// MSI Plessey
    Msi {
        /// Check digit scheme
        checksum: MsiChecksum,
    },
    /// 2-of-5 family except ITF-14
    TwoOfFive {
        /// Check digit mode
        checksum: Checksum,
    },
    /// UPC-E and UPC-E1
    UpcE {
        /// Report the zero-suppressed code expanded to UPC-A
        expand_to_upca: bool,
    },
    /// Micro QR and Data Matrix
    Dpm {
        /// Direct part marking mode (0 = off, 1 = on)
        dpm_mode: i32,
    },
    /// QR
    Qr {
        /// Direct part marking mode (0 = off, 1 = on)
        dpm_mode: i32,
        /// Merge structured-append fragments into one payload
        multi_part_merge: bool,
    },
    /// ID document
    IdDocument {
        /// MRZ master check digit verification
        master_checksum: Checksum,
    },
}

impl SymbologyOptions {
    /// Family default for `kind`; `None` for result-only kinds
    pub fn default_for(kind: SymbologyKind) -> Option<Self> {
        use SymbologyKind::*;
        let options = match kind {
            Code11 => SymbologyOptions::Code11 {
                checksum: Code11Checksum::default(),
            },
            Code39 => SymbologyOptions::Code39 {
                checksum: Code39Checksum::default(),
            },
            Msi => SymbologyOptions::Msi {
                checksum: MsiChecksum::default(),
            },
            Code25 | Interleaved25 | IATA25 | Matrix25 | Datalogic25 | COOP25 => {
                SymbologyOptions::TwoOfFive {
                    checksum: Checksum::default(),
                }
            }
            UpcE | UpcE1 => SymbologyOptions::UpcE {
                expand_to_upca: false,
            },
            QRMicro | Datamatrix => SymbologyOptions::Dpm { dpm_mode: 0 },
            QR => SymbologyOptions::Qr {
                dpm_mode: 0,
                multi_part_merge: false,
            },
            IDDocument => SymbologyOptions::IdDocument {
                master_checksum: Checksum::default(),
            },
            IDMRZ | IDPicture | IDSignature => return None,
            Aztec | AztecCompact | Code128 | Code93 | Codabar | UpcA | Ean13 | Ean8 | PDF417
            | PDF417Micro | ITF14 | Code32 | Telepen | Dotcode | Databar14 | DatabarLimited
            | DatabarExpanded | PostalIMB | Postnet | Planet | AustralianPost | RoyalMail | KIX
            | JapanesePost | MaxiCode => SymbologyOptions::Plain,
        };
        Some(options)
    }

    /// Whether this variant is the one `kind` owns
    pub fn matches_kind(&self, kind: SymbologyKind) -> bool {
        Self::default_for(kind).is_some_and(|d| mem::discriminant(&d) == mem::discriminant(self))
    }

    fn dpm_mode(&self) -> Option<i32> {
        match self {
            SymbologyOptions::Dpm { dpm_mode } | SymbologyOptions::Qr { dpm_mode, .. } => {
                Some(*dpm_mode)
            }
            _ => None,
        }
    }
}

/// Configuration block for one symbology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSpecificConfig")]
pub struct SpecificConfig {
    kind: SymbologyKind,
    enabled: bool,
    expected_count: u32,
    minimum_length: u32,
    maximum_length: u32,
    options: SymbologyOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpecificConfig {
    kind: SymbologyKind,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    expected_count: u32,
    #[serde(default)]
    minimum_length: u32,
    #[serde(default)]
    maximum_length: u32,
    options: SymbologyOptions,
}

impl TryFrom<RawSpecificConfig> for SpecificConfig {
    type Error = Error;

    fn try_from(raw: RawSpecificConfig) -> Result<Self> {
        let config = SpecificConfig {
            kind: raw.kind,
            enabled: raw.enabled,
            expected_count: raw.expected_count,
            minimum_length: raw.minimum_length,
            maximum_length: raw.maximum_length,
            options: raw.options,
        };
        config.validate()?;
        Ok(config)
    }
}

fn check_lengths(minimum: i32, maximum: i32) -> Result<(u32, u32)> {
    let (Ok(min), Ok(max)) = (u32::try_from(minimum), u32::try_from(maximum)) else {
        return Err(Error::invalid(format!(
            "length must be a non-negative number, got {}..{}",
            minimum, maximum
        )));
    };
    if min > 0 && max > 0 && max < min {
        return Err(Error::invalid(format!(
            "maximum length can't be smaller than minimum ({} < {})",
            max, min
        )));
    }
    Ok((min, max))
}

impl SpecificConfig {
    /// Family-default config for `kind`
    ///
    /// Fails for identity-document sub-fields, which have no decoder.
    pub fn new(kind: SymbologyKind) -> Result<Self> {
        let options = SymbologyOptions::default_for(kind).ok_or_else(|| {
            Error::invalid(format!("{} has no configurable decoder", kind.type_name()))
        })?;
        let minimum_length = match kind {
            SymbologyKind::Msi => 5,
            SymbologyKind::Codabar => 4,
            _ => 0,
        };
        Ok(Self {
            kind,
            enabled: false,
            expected_count: 0,
            minimum_length,
            maximum_length: 0,
            options,
        })
    }

    /// Builder form of [`set_length_range`](Self::set_length_range)
    pub fn with_length_range(mut self, minimum: i32, maximum: i32) -> Result<Self> {
        self.set_length_range(minimum, maximum)?;
        Ok(self)
    }

    /// Builder form of [`set_options`](Self::set_options)
    pub fn with_options(mut self, options: SymbologyOptions) -> Result<Self> {
        self.set_options(options)?;
        Ok(self)
    }

    /// Set the accepted payload length bounds; 0 means unbounded on that side
    pub fn set_length_range(&mut self, minimum: i32, maximum: i32) -> Result<()> {
        let (min, max) = check_lengths(minimum, maximum)?;
        self.minimum_length = min;
        self.maximum_length = max;
        Ok(())
    }

    /// Replace the family-specific options; the variant must match the kind
    pub fn set_options(&mut self, options: SymbologyOptions) -> Result<()> {
        let mut candidate = self.clone();
        candidate.options = options;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Set how many symbols of this kind the caller expects (0 = unconstrained)
    pub fn set_expected_count(&mut self, count: i32) -> Result<()> {
        self.expected_count = u32::try_from(count)
            .map_err(|_| Error::invalid(format!("expected count must be non-negative, got {}", count)))?;
        Ok(())
    }

    /// Mark this block active or inactive
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check every invariant of this block
    pub fn validate(&self) -> Result<()> {
        if !self.options.matches_kind(self.kind) {
            return Err(Error::invalid(format!(
                "options {:?} do not apply to {}",
                self.options,
                self.kind.type_name()
            )));
        }
        if self.minimum_length > 0
            && self.maximum_length > 0
            && self.maximum_length < self.minimum_length
        {
            return Err(Error::invalid(format!(
                "maximum length can't be smaller than minimum ({} < {})",
                self.maximum_length, self.minimum_length
            )));
        }
        if let Some(mode) = self.options.dpm_mode() {
            if !(0..=1).contains(&mode) {
                return Err(Error::invalid(format!("dpm mode must be 0 or 1, got {}", mode)));
            }
        }
        Ok(())
    }

    /// Apply a field patch atomically; nothing changes on error
    pub fn apply(&mut self, patch: &SpecificConfigPatch) -> Result<()> {
        let mut next = self.clone();
        let type_name = self.kind.type_name();
        let reject = |field: &str| {
            Error::invalid(format!("field '{}' does not apply to {}", field, type_name))
        };

        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(count) = patch.expected_count {
            next.set_expected_count(count)?;
        }
        if patch.minimum_length.is_some() || patch.maximum_length.is_some() {
            let min = patch.minimum_length.unwrap_or(next.minimum_length as i32);
            let max = patch.maximum_length.unwrap_or(next.maximum_length as i32);
            next.set_length_range(min, max)?;
        }

        if let Some(name) = patch.checksum_type.as_deref() {
            let unknown = || {
                Error::invalid(format!("unknown checksum type '{}' for {}", name, type_name))
            };
            match &mut next.options {
                SymbologyOptions::Code11 { checksum } => {
                    *checksum = Code11Checksum::from_name(name).ok_or_else(unknown)?
                }
                SymbologyOptions::Code39 { checksum } => {
                    *checksum = Code39Checksum::from_name(name).ok_or_else(unknown)?
                }
                SymbologyOptions::Msi { checksum } => {
                    *checksum = MsiChecksum::from_name(name).ok_or_else(unknown)?
                }
                SymbologyOptions::TwoOfFive { checksum } => {
                    *checksum = Checksum::from_name(name).ok_or_else(unknown)?
                }
                _ => return Err(reject("checksumType")),
            }
        }
        if let Some(name) = patch.master_checksum_type.as_deref() {
            let SymbologyOptions::IdDocument { master_checksum } = &mut next.options else {
                return Err(reject("masterChecksumType"));
            };
            *master_checksum = Checksum::from_name(name).ok_or_else(|| {
                Error::invalid(format!("unknown checksum type '{}' for {}", name, type_name))
            })?;
        }
        if let Some(expand) = patch.expand_to_upca {
            let SymbologyOptions::UpcE { expand_to_upca } = &mut next.options else {
                return Err(reject("expandToUPCA"));
            };
            *expand_to_upca = expand;
        }
        if let Some(mode) = patch.dpm_mode {
            match &mut next.options {
                SymbologyOptions::Dpm { dpm_mode } | SymbologyOptions::Qr { dpm_mode, .. } => {
                    *dpm_mode = mode
                }
                _ => return Err(reject("dpmMode")),
            }
        }
        if let Some(merge) = patch.multi_part_merge {
            let SymbologyOptions::Qr {
                multi_part_merge, ..
            } = &mut next.options
            else {
                return Err(reject("multiPartMerge"));
            };
            *multi_part_merge = merge;
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Symbology this block configures
    pub fn kind(&self) -> SymbologyKind {
        self.kind
    }

    /// Whether the engine consults this block
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Expected symbol count (0 = unconstrained)
    pub fn expected_count(&self) -> u32 {
        self.expected_count
    }

    /// Minimum payload length (0 = unbounded)
    pub fn minimum_length(&self) -> u32 {
        self.minimum_length
    }

    /// Maximum payload length (0 = unbounded)
    pub fn maximum_length(&self) -> u32 {
        self.maximum_length
    }

    /// Family-specific options
    pub fn options(&self) -> &SymbologyOptions {
        &self.options
    }

    /// Placeholder for kinds without a decoder; never stored
    pub(crate) fn inert(kind: SymbologyKind) -> Self {
        Self {
            kind,
            enabled: false,
            expected_count: 0,
            minimum_length: 0,
            maximum_length: 0,
            options: SymbologyOptions::Plain,
        }
    }
}

/// Partial update of a [`SpecificConfig`], as received from a caller.
///
/// Every field is optional. Fields the target family does not own are
/// rejected rather than ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecificConfigPatch {
    /// Activate or deactivate the symbology
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Symbols of this kind expected per image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_count: Option<i32>,
    /// Lower payload length bound (0 = none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_length: Option<i32>,
    /// Upper payload length bound (0 = none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<i32>,
    /// Checksum mode name for Code 11, Code 39, MSI and the 2-of-5 family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_type: Option<String>,
    /// ID document master checksum mode name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_checksum_type: Option<String>,
    /// UPC-E only: report the expanded UPC-A code
    #[serde(rename = "expandToUPCA", skip_serializing_if = "Option::is_none")]
    pub expand_to_upca: Option<bool>,
    /// QR, Micro QR and Data Matrix: direct part marking mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpm_mode: Option<i32>,
    /// QR only: merge structured-append fragments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_part_merge: Option<bool>,
}

impl SpecificConfigPatch {
    /// Parse a patch from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid(format!("malformed config fields: {}", e)))
    }
}
