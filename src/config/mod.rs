//! Scan configuration model
//!
//! [`ScanConfiguration`] is the single source of truth the decoding engine
//! consults at the start of every decode call:
//! - Enabled symbology set
//! - Speed/thoroughness tier and post-decode formatting
//! - Region of interest and result limit
//! - Global engine resource options
//! - One [`SpecificConfig`] per symbology

/// Per-symbology configuration blocks
pub mod specific;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::SymbologyKind;

pub use specific::{
    Checksum, Code11Checksum, Code39Checksum, MsiChecksum, SpecificConfig, SpecificConfigPatch,
    SymbologyOptions,
};

/// Decoding thoroughness tier; each tier detects at least what the lower ones do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum DecodingSpeed {
    /// Fastest, least thorough
    Fast = 0,
    /// Balanced default
    #[default]
    Normal = 1,
    /// Slower, recovers harder symbols
    Slow = 2,
    /// Exhaustive search
    Rigorous = 3,
}

impl DecodingSpeed {
    /// Tier from its integer id (0=Fast, 1=Normal, 2=Slow, 3=Rigorous)
    pub fn from_id(id: i32) -> Result<Self> {
        match id {
            0 => Ok(DecodingSpeed::Fast),
            1 => Ok(DecodingSpeed::Normal),
            2 => Ok(DecodingSpeed::Slow),
            3 => Ok(DecodingSpeed::Rigorous),
            _ => Err(Error::invalid(format!("unknown decoding speed {}", id))),
        }
    }
}

/// Post-decode textual reformatting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Formatting {
    /// Payload reported verbatim
    #[default]
    Disabled = 0,
    /// Engine picks a formatter from the payload
    Automatic = 1,
    /// GS1 application identifiers
    GS1 = 2,
    /// AAMVA driver license data
    AAMVA = 3,
    /// South African driver license data
    SADL = 4,
}

impl Formatting {
    /// Mode from its integer id
    pub fn from_id(id: i32) -> Result<Self> {
        match id {
            0 => Ok(Formatting::Disabled),
            1 => Ok(Formatting::Automatic),
            2 => Ok(Formatting::GS1),
            3 => Ok(Formatting::AAMVA),
            4 => Ok(Formatting::SADL),
            _ => Err(Error::invalid(format!("unknown formatting mode {}", id))),
        }
    }
}

/// Scan window in percent of the image.
///
/// `width`/`height` extend from `left`/`top`; a window running past the
/// image edge is clipped by the engine at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion")]
pub struct RegionOfInterest {
    /// Left edge, percent of image width
    pub left: f32,
    /// Top edge, percent of image height
    pub top: f32,
    /// Window width, percent of image width
    pub width: f32,
    /// Window height, percent of image height
    pub height: f32,
}

#[derive(Deserialize)]
struct RawRegion {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl TryFrom<RawRegion> for RegionOfInterest {
    type Error = Error;

    fn try_from(raw: RawRegion) -> Result<Self> {
        Self::new(raw.left, raw.top, raw.width, raw.height)
    }
}

impl RegionOfInterest {
    /// The whole image
    pub const FULL: RegionOfInterest = RegionOfInterest {
        left: 0.0,
        top: 0.0,
        width: 100.0,
        height: 100.0,
    };

    /// Validated constructor: every value must be finite and within [0, 100]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Result<Self> {
        let roi = Self {
            left,
            top,
            width,
            height,
        };
        roi.validate()?;
        Ok(roi)
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in fields {
            if !(0.0..=100.0).contains(&value) {
                return Err(Error::invalid(format!(
                    "region of interest {} must be within 0..=100, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for RegionOfInterest {
    fn default() -> Self {
        Self::FULL
    }
}

/// Engine-wide resource options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalOptions {
    /// Decoder worker threads (at least 1)
    pub maximum_threads: u32,
    /// Offload decoding to the GPU where supported
    pub use_gpu: bool,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            maximum_threads: 1,
            use_gpu: false,
        }
    }
}

/// Complete scan configuration for one session.
///
/// Deserializing re-checks every invariant and re-syncs each stored block's
/// `enabled` flag from the enabled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawScanConfiguration")]
pub struct ScanConfiguration {
    enabled_symbologies: BTreeSet<SymbologyKind>,
    decoding_speed: DecodingSpeed,
    region_of_interest: RegionOfInterest,
    #[serde(rename = "maximumResultsCount")]
    result_limit: u32,
    formatting: Formatting,
    global_options: GlobalOptions,
    per_symbology: BTreeMap<SymbologyKind, SpecificConfig>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScanConfiguration {
    enabled_symbologies: BTreeSet<SymbologyKind>,
    decoding_speed: DecodingSpeed,
    region_of_interest: RegionOfInterest,
    #[serde(rename = "maximumResultsCount")]
    result_limit: u32,
    formatting: Formatting,
    global_options: GlobalOptions,
    per_symbology: BTreeMap<SymbologyKind, SpecificConfig>,
}

impl TryFrom<RawScanConfiguration> for ScanConfiguration {
    type Error = Error;

    fn try_from(raw: RawScanConfiguration) -> Result<Self> {
        let mut config = ScanConfiguration {
            enabled_symbologies: raw.enabled_symbologies,
            decoding_speed: raw.decoding_speed,
            region_of_interest: raw.region_of_interest,
            result_limit: raw.result_limit,
            formatting: raw.formatting,
            global_options: raw.global_options,
            per_symbology: raw.per_symbology,
        };
        config.validate()?;
        let enabled = &config.enabled_symbologies;
        for (kind, specific) in config.per_symbology.iter_mut() {
            specific.set_enabled(enabled.contains(kind));
        }
        Ok(config)
    }
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfiguration {
    /// Empty configuration: nothing enabled, engine defaults everywhere
    pub fn new() -> Self {
        Self {
            enabled_symbologies: BTreeSet::new(),
            decoding_speed: DecodingSpeed::default(),
            region_of_interest: RegionOfInterest::FULL,
            result_limit: 0,
            formatting: Formatting::default(),
            global_options: GlobalOptions::default(),
            per_symbology: BTreeMap::new(),
        }
    }

    /// Replace the enabled set wholesale.
    ///
    /// Configs of kinds dropped from the set stay stored (inert) so toggling a
    /// symbology off and on again keeps its settings.
    pub fn set_enabled_symbologies(&mut self, kinds: &[SymbologyKind]) -> Result<()> {
        if let Some(kind) = kinds.iter().find(|k| !k.is_decoder()) {
            return Err(Error::invalid(format!(
                "{} is not a decoder and cannot be enabled",
                kind.type_name()
            )));
        }

        self.enabled_symbologies = kinds.iter().copied().collect();
        for &kind in &self.enabled_symbologies {
            if !self.per_symbology.contains_key(&kind) {
                // is_decoder() was checked above, so a family default exists
                let config = SpecificConfig::new(kind)?;
                self.per_symbology.insert(kind, config);
            }
        }
        for (kind, config) in self.per_symbology.iter_mut() {
            config.set_enabled(self.enabled_symbologies.contains(kind));
        }

        debug!(
            enabled = self.enabled_symbologies.len(),
            stored = self.per_symbology.len(),
            "enabled symbologies replaced"
        );
        Ok(())
    }

    /// Replace the enabled set from engine decoder ids (0..=39)
    pub fn set_enabled_decoders(&mut self, decoder_ids: &[i32]) -> Result<()> {
        let kinds = decoder_ids
            .iter()
            .map(|&id| {
                SymbologyKind::from_decoder_id(id)
                    .ok_or_else(|| Error::invalid(format!("unknown decoder type {}", id)))
            })
            .collect::<Result<Vec<_>>>()?;
        self.set_enabled_symbologies(&kinds)
    }

    /// Replace the enabled set from symbology names; any unknown name fails the call
    pub fn enable_decoders_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let kinds = names
            .iter()
            .map(|name| name.as_ref().parse::<SymbologyKind>())
            .collect::<Result<Vec<_>>>()?;
        self.set_enabled_symbologies(&kinds)
    }

    /// Choose the thoroughness tier
    pub fn set_decoding_speed(&mut self, speed: DecodingSpeed) {
        self.decoding_speed = speed;
    }

    /// Choose the post-decode formatter
    pub fn set_formatting(&mut self, formatting: Formatting) {
        self.formatting = formatting;
    }

    /// Restrict scanning to a window given in percent
    pub fn set_region_of_interest(
        &mut self,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        self.region_of_interest = RegionOfInterest::new(left, top, width, height)?;
        Ok(())
    }

    /// Cap the number of symbols returned per decode call
    pub fn set_result_limit(&mut self, limit: i32) -> Result<()> {
        self.result_limit = u32::try_from(limit)
            .map_err(|_| Error::invalid(format!("result limit must be non-negative, got {}", limit)))?;
        Ok(())
    }

    /// Replace the engine resource options; at least one thread
    pub fn set_global_options(&mut self, options: GlobalOptions) -> Result<()> {
        if options.maximum_threads == 0 {
            return Err(Error::invalid("maximum threads must be at least 1"));
        }
        self.global_options = options;
        Ok(())
    }

    /// Store a validated per-symbology block.
    ///
    /// The block's `enabled` flag updates membership in the enabled set.
    pub fn set_specific_config(&mut self, config: SpecificConfig) -> Result<()> {
        if !config.kind().is_decoder() {
            return Err(Error::invalid(format!(
                "{} has no configurable decoder",
                config.kind().type_name()
            )));
        }
        config.validate()?;

        let kind = config.kind();
        if config.enabled() {
            self.enabled_symbologies.insert(kind);
        } else {
            self.enabled_symbologies.remove(&kind);
        }
        debug!(kind = kind.type_name(), enabled = config.enabled(), "specific config stored");
        self.per_symbology.insert(kind, config);
        Ok(())
    }

    /// Patch the stored (or family default) block for `kind`
    pub fn update_specific_config(
        &mut self,
        kind: SymbologyKind,
        patch: &SpecificConfigPatch,
    ) -> Result<()> {
        let mut config = match self.per_symbology.get(&kind) {
            Some(config) => config.clone(),
            None => SpecificConfig::new(kind)?,
        };
        config.apply(patch)?;
        self.set_specific_config(config)
    }

    /// Stored block for `kind`, or its family default; never fails
    pub fn get_specific_config(&self, kind: SymbologyKind) -> SpecificConfig {
        if let Some(config) = self.per_symbology.get(&kind) {
            return config.clone();
        }
        SpecificConfig::new(kind).unwrap_or_else(|_| SpecificConfig::inert(kind))
    }

    /// Blocks the engine consults: enabled kinds only, in id order
    pub fn active_configs(&self) -> impl Iterator<Item = &SpecificConfig> {
        self.enabled_symbologies
            .iter()
            .filter_map(|kind| self.per_symbology.get(kind))
    }

    /// Whether a block is stored for `kind`, enabled or not
    pub fn has_stored_config(&self, kind: SymbologyKind) -> bool {
        self.per_symbology.contains_key(&kind)
    }

    /// Kinds the engine searches for
    pub fn enabled_symbologies(&self) -> &BTreeSet<SymbologyKind> {
        &self.enabled_symbologies
    }

    /// Whether `kind` is in the enabled set
    pub fn is_enabled(&self, kind: SymbologyKind) -> bool {
        self.enabled_symbologies.contains(&kind)
    }

    /// Current thoroughness tier
    pub fn decoding_speed(&self) -> DecodingSpeed {
        self.decoding_speed
    }

    /// Scan window in percent
    pub fn region_of_interest(&self) -> RegionOfInterest {
        self.region_of_interest
    }

    /// Maximum symbols per decode call (0 = engine default)
    pub fn result_limit(&self) -> u32 {
        self.result_limit
    }

    /// Current post-decode formatter
    pub fn formatting(&self) -> Formatting {
        self.formatting
    }

    /// Engine resource options
    pub fn global_options(&self) -> GlobalOptions {
        self.global_options
    }

    /// Check every invariant, including each stored block
    pub fn validate(&self) -> Result<()> {
        self.region_of_interest.validate()?;
        if self.global_options.maximum_threads == 0 {
            return Err(Error::invalid("maximum threads must be at least 1"));
        }
        for (kind, config) in &self.per_symbology {
            if config.kind() != *kind {
                return Err(Error::invalid(format!(
                    "config for {} stored under {}",
                    config.kind().type_name(),
                    kind.type_name()
                )));
            }
            config.validate()?;
        }
        for kind in &self.enabled_symbologies {
            if !self.per_symbology.contains_key(kind) {
                return Err(Error::invalid(format!(
                    "enabled symbology {} has no config",
                    kind.type_name()
                )));
            }
        }
        Ok(())
    }

    /// Persist as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::serialization("configuration", e.to_string()))
    }

    /// Load persisted JSON, re-checking every invariant
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid(format!("malformed configuration: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_bounds() {
        let mut config = ScanConfiguration::new();
        assert!(config.set_region_of_interest(0.0, 0.0, 100.0, 100.0).is_ok());
        assert!(config.set_region_of_interest(60.0, 60.0, 80.0, 80.0).is_ok());
        assert!(config.set_region_of_interest(-0.1, 0.0, 10.0, 10.0).is_err());
        assert!(config.set_region_of_interest(0.0, 0.0, 100.5, 10.0).is_err());
        assert!(config.set_region_of_interest(f32::NAN, 0.0, 10.0, 10.0).is_err());
        // failed calls leave the last good window in place
        assert_eq!(
            config.region_of_interest(),
            RegionOfInterest::new(60.0, 60.0, 80.0, 80.0).unwrap()
        );
    }

    #[test]
    fn test_speed_and_formatting_ids() {
        assert_eq!(DecodingSpeed::from_id(3).unwrap(), DecodingSpeed::Rigorous);
        assert!(DecodingSpeed::from_id(4).is_err());
        assert!(DecodingSpeed::from_id(-1).is_err());
        assert!(DecodingSpeed::Fast < DecodingSpeed::Rigorous);
        assert_eq!(Formatting::from_id(4).unwrap(), Formatting::SADL);
        assert!(Formatting::from_id(5).is_err());
    }

    #[test]
    fn test_result_limit() {
        let mut config = ScanConfiguration::new();
        config.set_result_limit(5).unwrap();
        assert_eq!(config.result_limit(), 5);
        assert!(config.set_result_limit(-1).unwrap_err().is_invalid_argument());
        assert_eq!(config.result_limit(), 5);
    }

    #[test]
    fn test_enable_creates_defaults_and_keeps_inert_configs() {
        let mut config = ScanConfiguration::new();
        config
            .set_enabled_symbologies(&[SymbologyKind::QR, SymbologyKind::Msi])
            .unwrap();
        let msi = config
            .get_specific_config(SymbologyKind::Msi)
            .with_length_range(6, 10)
            .unwrap();
        config.set_specific_config(msi).unwrap();

        config.set_enabled_symbologies(&[SymbologyKind::QR]).unwrap();
        assert!(!config.is_enabled(SymbologyKind::Msi));
        assert!(config.has_stored_config(SymbologyKind::Msi));
        assert_eq!(config.active_configs().count(), 1);

        config
            .set_enabled_symbologies(&[SymbologyKind::Msi])
            .unwrap();
        let msi = config.get_specific_config(SymbologyKind::Msi);
        assert!(msi.enabled());
        assert_eq!((msi.minimum_length(), msi.maximum_length()), (6, 10));
    }

    #[test]
    fn test_enable_rejects_result_only_kinds() {
        let mut config = ScanConfiguration::new();
        config.set_enabled_symbologies(&[SymbologyKind::QR]).unwrap();
        let err = config
            .set_enabled_symbologies(&[SymbologyKind::Code128, SymbologyKind::IDMRZ])
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(config.is_enabled(SymbologyKind::QR));
        assert!(!config.is_enabled(SymbologyKind::Code128));
    }

    #[test]
    fn test_enable_by_decoder_id() {
        let mut config = ScanConfiguration::new();
        config.set_enabled_decoders(&[2, 29, 39]).unwrap();
        let enabled: Vec<_> = config.enabled_symbologies().iter().copied().collect();
        assert_eq!(
            enabled,
            vec![SymbologyKind::QR, SymbologyKind::Databar14, SymbologyKind::MaxiCode]
        );
        assert!(config.set_enabled_decoders(&[2, 40]).is_err());
        assert_eq!(config.enabled_symbologies().len(), 3);
    }

    #[test]
    fn test_enable_by_name() {
        let mut config = ScanConfiguration::new();
        config
            .enable_decoders_by_name(&["QR", "code 128", "Ean-13"])
            .unwrap();
        assert_eq!(config.enabled_symbologies().len(), 3);

        let err = config
            .enable_decoders_by_name(&["QR", "Hanxin"])
            .unwrap_err();
        assert!(err.to_string().contains("Hanxin"));
        assert_eq!(config.enabled_symbologies().len(), 3);
    }

    #[test]
    fn test_specific_config_enabled_flag_drives_set() {
        let mut config = ScanConfiguration::new();
        let mut upce = SpecificConfig::new(SymbologyKind::UpcE).unwrap();
        upce.set_enabled(true);
        config.set_specific_config(upce).unwrap();
        assert!(config.is_enabled(SymbologyKind::UpcE));
    }

    #[test]
    fn test_update_specific_config() {
        let mut config = ScanConfiguration::new();
        let patch = SpecificConfigPatch::from_json(r#"{"dpmMode":1,"multiPartMerge":true}"#).unwrap();
        config.update_specific_config(SymbologyKind::QR, &patch).unwrap();
        assert_eq!(
            config.get_specific_config(SymbologyKind::QR).options(),
            &SymbologyOptions::Qr {
                dpm_mode: 1,
                multi_part_merge: true
            }
        );
        assert!(config
            .update_specific_config(SymbologyKind::IDSignature, &patch)
            .is_err());
    }

    #[test]
    fn test_get_specific_config_never_fails() {
        let config = ScanConfiguration::new();
        for kind in SymbologyKind::ALL {
            assert_eq!(config.get_specific_config(kind).kind(), kind);
        }
    }

    #[test]
    fn test_global_options() {
        let mut config = ScanConfiguration::new();
        assert_eq!(config.global_options().maximum_threads, 1);
        assert!(!config.global_options().use_gpu);
        assert!(config
            .set_global_options(GlobalOptions {
                maximum_threads: 0,
                use_gpu: false
            })
            .is_err());
    }

    #[test]
    fn test_json_persistence_roundtrip() {
        let mut config = ScanConfiguration::new();
        config
            .set_enabled_symbologies(&[SymbologyKind::Code11, SymbologyKind::Datamatrix])
            .unwrap();
        config.set_decoding_speed(DecodingSpeed::Slow);
        config.set_formatting(Formatting::GS1);
        config.set_region_of_interest(10.0, 20.0, 50.0, 40.0).unwrap();
        config.set_result_limit(3).unwrap();

        let json = config.to_json().unwrap();
        assert!(json.contains("\"maximumResultsCount\":3"));
        let back = ScanConfiguration::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let bad_roi = r#"{"enabledSymbologies":[],"decodingSpeed":"Normal",
            "regionOfInterest":{"left":0,"top":0,"width":150,"height":10},
            "maximumResultsCount":1,"formatting":"Disabled",
            "globalOptions":{"maximumThreads":1,"useGpu":false},"perSymbology":{}}"#;
        assert!(ScanConfiguration::from_json(bad_roi).is_err());

        let enabled_without_config = r#"{"enabledSymbologies":[2],"decodingSpeed":"Normal",
            "regionOfInterest":{"left":0,"top":0,"width":100,"height":100},
            "maximumResultsCount":1,"formatting":"Disabled",
            "globalOptions":{"maximumThreads":1,"useGpu":false},"perSymbology":{}}"#;
        assert!(ScanConfiguration::from_json(enabled_without_config).is_err());
    }

    #[test]
    fn test_serde_deserialize_enforces_invariants() {
        let config = |roi: &str, threads: u32, enabled: &str| {
            format!(
                r#"{{"enabledSymbologies":{},"decodingSpeed":"Normal","regionOfInterest":{},
                "maximumResultsCount":1,"formatting":"Disabled",
                "globalOptions":{{"maximumThreads":{},"useGpu":false}},"perSymbology":{{}}}}"#,
                enabled, roi, threads
            )
        };
        let full = r#"{"left":0,"top":0,"width":100,"height":100}"#;
        let wide = r#"{"left":0,"top":0,"width":150,"height":10}"#;

        assert!(serde_json::from_str::<ScanConfiguration>(&config(full, 1, "[]")).is_ok());
        assert!(serde_json::from_str::<ScanConfiguration>(&config(wide, 1, "[]")).is_err());
        assert!(serde_json::from_str::<ScanConfiguration>(&config(full, 0, "[]")).is_err());
        assert!(serde_json::from_str::<ScanConfiguration>(&config(full, 1, "[2]")).is_err());

        assert!(serde_json::from_str::<RegionOfInterest>(wide).is_err());
        let roi: RegionOfInterest = serde_json::from_str(full).unwrap();
        assert_eq!(roi, RegionOfInterest::FULL);
    }

    #[test]
    fn test_serde_deserialize_syncs_enabled_flags() {
        let mut source = ScanConfiguration::new();
        source.set_enabled_symbologies(&[SymbologyKind::QR]).unwrap();
        let mut value = serde_json::to_value(&source).unwrap();
        // stored block claims enabled=false while the set lists it
        value["perSymbology"]["2"]["enabled"] = serde_json::Value::Bool(false);
        let restored: ScanConfiguration = serde_json::from_value(value).unwrap();
        assert!(restored.get_specific_config(SymbologyKind::QR).enabled());
    }
}
