//! Environment tunables, read once per process.

use std::str::FromStr;
use std::sync::OnceLock;

/// Parse `name` as `T`; unset or unparsable values fall back to `default`
fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Numeric switch: any non-zero integer enables
fn env_flag(name: &str, default: bool) -> bool {
    parse_env::<i64>(name, i64::from(default)) != 0
}

static DEFAULT_RESULT_LIMIT: OnceLock<u32> = OnceLock::new();

/// Result limit applied by `Session::initialize` (`BARCODE_DEFAULT_RESULT_LIMIT`, default 1).
pub(crate) fn default_result_limit() -> u32 {
    *DEFAULT_RESULT_LIMIT.get_or_init(|| parse_env("BARCODE_DEFAULT_RESULT_LIMIT", 1u32))
}

static DECODE_TIME_BUDGET_MS: OnceLock<u64> = OnceLock::new();

/// Default per-decode time budget in milliseconds; 0 disables the deadline.
pub(crate) fn decode_time_budget_ms() -> u64 {
    *DECODE_TIME_BUDGET_MS.get_or_init(|| parse_env("BARCODE_DECODE_TIME_BUDGET_MS", 0u64))
}

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

pub(crate) fn debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| env_flag("BARCODE_DEBUG", false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_falls_back_on_missing_var() {
        assert_eq!(parse_env("BARCODE_TEST_SURELY_UNSET_U64", 42u64), 42);
        assert_eq!(parse_env("BARCODE_TEST_SURELY_UNSET_U32", 3u32), 3);
        assert!(env_flag("BARCODE_TEST_SURELY_UNSET_BOOL", true));
        assert!(!env_flag("BARCODE_TEST_SURELY_UNSET_BOOL", false));
    }

    #[test]
    fn test_parse_reads_and_trims() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("BARCODE_TEST_PARSE_LIMIT", " 7 ");
            std::env::set_var("BARCODE_TEST_PARSE_BAD", "seven");
            std::env::set_var("BARCODE_TEST_PARSE_FLAG", "2");
        }
        assert_eq!(parse_env("BARCODE_TEST_PARSE_LIMIT", 1u32), 7);
        assert_eq!(parse_env("BARCODE_TEST_PARSE_BAD", 1u32), 1);
        assert!(env_flag("BARCODE_TEST_PARSE_FLAG", false));
    }
}
