//! Owned decoding session
//!
//! A [`Session`] owns the external engine and the [`ScanConfiguration`] the
//! engine hands back on license activation. Every mutating operation takes
//! `&mut self`, so access to one configuration is serialized by construction;
//! independent sessions share nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::aggregate::{DecodeResponse, aggregate};
use crate::config::{
    DecodingSpeed, Formatting, GlobalOptions, ScanConfiguration, SpecificConfig,
    SpecificConfigPatch,
};
use crate::env;
use crate::error::{EngineError, Error, Result};
use crate::models::{DecodeRecord, GrayFrame, SymbologyKind};

/// Shared flag a caller flips to abandon an in-flight decode
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, untriggered token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; visible to every clone
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether any clone has called [`cancel`](Self::cancel)
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Why a decode should stop early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancel token was triggered
    Cancelled,
    /// The deadline passed
    DeadlineExceeded,
}

/// Deadline and cancellation for one decode call.
///
/// Engines should poll [`should_stop`](Self::should_stop) between candidates.
#[derive(Debug, Clone, Default)]
pub struct DecodeControl {
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl DecodeControl {
    /// No deadline, not cancellable
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Stop once `budget` has elapsed from now
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.deadline = Some(Instant::now() + budget);
        self
    }

    /// Stop at an absolute instant
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop when `token` is cancelled
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Control derived from `BARCODE_DECODE_TIME_BUDGET_MS`
    pub fn from_env() -> Self {
        match env::decode_time_budget_ms() {
            0 => Self::unbounded(),
            ms => Self::unbounded().with_budget(Duration::from_millis(ms)),
        }
    }

    /// Whether the engine should abandon work, and why
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(StopReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(StopReason::DeadlineExceeded);
        }
        None
    }

    /// Shorthand for `stop_reason().is_some()`
    pub fn should_stop(&self) -> bool {
        self.stop_reason().is_some()
    }
}

/// Successful license activation
#[derive(Debug, Clone)]
pub struct Activation {
    /// Engine status message
    pub message: String,
    /// Configuration the session takes ownership of
    pub configuration: ScanConfiguration,
}

/// Seam to the precompiled decoding engine and its licensing subsystem
pub trait DecodingEngine {
    /// Engine library version string
    fn library_version(&self) -> String;

    /// Validate a license key and hand out the session configuration.
    ///
    /// A rejected key is reported as `Err` with the engine's message.
    fn initialize_with_license_key(&mut self, key: &str) -> std::result::Result<Activation, EngineError>;

    /// Decode every symbol in `frame`, honouring `config` and polling `control`
    fn decode(
        &mut self,
        config: &ScanConfiguration,
        frame: GrayFrame<'_>,
        control: &DecodeControl,
    ) -> std::result::Result<Vec<DecodeRecord>, EngineError>;
}

/// One decoding session over an engine
pub struct Session<E: DecodingEngine> {
    engine: E,
    config: Option<ScanConfiguration>,
}

impl<E: DecodingEngine> Session<E> {
    /// Wrap an engine; the session starts uninitialized
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: None,
        }
    }

    /// Activate the engine with a license key and apply session defaults.
    ///
    /// Defaults: normal speed, result limit from `BARCODE_DEFAULT_RESULT_LIMIT`
    /// (1 unless overridden), one worker thread, no GPU. Returns the engine's
    /// status message. On failure the session stays (or becomes) uninitialized.
    pub fn initialize(&mut self, license_key: &str) -> Result<String> {
        let activation = match self.engine.initialize_with_license_key(license_key) {
            Ok(activation) => activation,
            Err(err) => {
                warn!(code = err.code, "license activation rejected: {}", err.message);
                self.config = None;
                return Err(Error::Licensing(err.message));
            }
        };

        let mut config = activation.configuration;
        if let Err(err) = config.validate() {
            warn!("engine handed out an invalid configuration: {}", err);
            self.config = None;
            return Err(err);
        }
        config.set_global_options(GlobalOptions::default())?;
        config.set_decoding_speed(DecodingSpeed::Normal);
        let limit = i32::try_from(env::default_result_limit()).unwrap_or(i32::MAX);
        config.set_result_limit(limit)?;

        debug!(version = %self.engine.library_version(), "session initialized");
        self.config = Some(config);
        Ok(activation.message)
    }

    /// Whether a license key has been accepted
    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    /// Engine library version; available before initialization
    pub fn library_version(&self) -> String {
        self.engine.library_version()
    }

    /// The wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Current configuration
    pub fn configuration(&self) -> Result<&ScanConfiguration> {
        self.config.as_ref().ok_or(Error::NotInitialized)
    }

    /// Mutable access for settings without a forwarding method
    pub fn configuration_mut(&mut self) -> Result<&mut ScanConfiguration> {
        self.config.as_mut().ok_or(Error::NotInitialized)
    }

    /// See [`ScanConfiguration::set_enabled_symbologies`]
    pub fn set_enabled_symbologies(&mut self, kinds: &[SymbologyKind]) -> Result<()> {
        self.configuration_mut()?.set_enabled_symbologies(kinds)
    }

    /// See [`ScanConfiguration::set_enabled_decoders`]
    pub fn set_enabled_decoders(&mut self, decoder_ids: &[i32]) -> Result<()> {
        self.configuration_mut()?.set_enabled_decoders(decoder_ids)
    }

    /// See [`ScanConfiguration::enable_decoders_by_name`]
    pub fn enable_decoders_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.configuration_mut()?.enable_decoders_by_name(names)
    }

    /// Choose the thoroughness tier
    pub fn set_decoding_speed(&mut self, speed: DecodingSpeed) -> Result<()> {
        self.configuration_mut()?.set_decoding_speed(speed);
        Ok(())
    }

    /// Choose the post-decode formatter
    pub fn set_formatting(&mut self, formatting: Formatting) -> Result<()> {
        self.configuration_mut()?.set_formatting(formatting);
        Ok(())
    }

    /// Restrict scanning to a window given in percent
    pub fn set_region_of_interest(&mut self, left: f32, top: f32, width: f32, height: f32) -> Result<()> {
        self.configuration_mut()?
            .set_region_of_interest(left, top, width, height)
    }

    /// Cap the number of symbols per decode call
    pub fn set_result_limit(&mut self, limit: i32) -> Result<()> {
        self.configuration_mut()?.set_result_limit(limit)
    }

    /// See [`ScanConfiguration::set_specific_config`]
    pub fn set_specific_config(&mut self, config: SpecificConfig) -> Result<()> {
        self.configuration_mut()?.set_specific_config(config)
    }

    /// Patch one symbology block atomically
    pub fn update_specific_config(&mut self, kind: SymbologyKind, patch: &SpecificConfigPatch) -> Result<()> {
        self.configuration_mut()?.update_specific_config(kind, patch)
    }

    /// Stored block for `kind`, or its family default
    pub fn get_specific_config(&self, kind: SymbologyKind) -> Result<SpecificConfig> {
        Ok(self.configuration()?.get_specific_config(kind))
    }

    /// Decode a grayscale buffer using the environment's default time budget
    pub fn decode(&mut self, data: &[u8], width: usize, height: usize) -> Result<DecodeResponse> {
        self.decode_with_control(data, width, height, &DecodeControl::from_env())
    }

    /// Decode a grayscale buffer under an explicit deadline / cancel token.
    ///
    /// Engine failures are returned as [`Error::EngineFailure`], never as an
    /// empty response.
    pub fn decode_with_control(
        &mut self,
        data: &[u8],
        width: usize,
        height: usize,
        control: &DecodeControl,
    ) -> Result<DecodeResponse> {
        let config = self.config.as_ref().ok_or(Error::NotInitialized)?;
        let frame = GrayFrame::new(data, width, height)?;

        if let Some(reason) = control.stop_reason() {
            return Err(stop_error(reason));
        }

        let records = self.engine.decode(config, frame, control).map_err(|err| {
            warn!(code = err.code, "engine decode failed: {}", err.message);
            Error::EngineFailure(err)
        })?;

        if let Some(reason) = control.stop_reason() {
            debug!(partial = records.len(), ?reason, "decode stopped early");
            return Err(stop_error(reason));
        }

        let limit = config.result_limit() as usize;
        if limit > 0 && records.len() > limit {
            warn!(
                returned = records.len(),
                limit, "engine returned more records than the result limit"
            );
        }

        let response = aggregate(records)?;
        debug!(
            width,
            height,
            results = response.results_count(),
            "decode finished"
        );
        if env::debug_enabled() {
            debug!(body = ?response, "decode response");
        }
        Ok(response)
    }

    /// Decode and render the wire text in one step
    pub fn decode_json(&mut self, data: &[u8], width: usize, height: usize) -> Result<String> {
        self.decode(data, width, height)?.to_json()
    }
}

fn stop_error(reason: StopReason) -> Error {
    match reason {
        StopReason::Cancelled => Error::Cancelled,
        StopReason::DeadlineExceeded => Error::DeadlineExceeded,
    }
}
