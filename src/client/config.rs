//! Client configuration.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Result, SummaryError};

/// Group used when the caller does not name one.
pub const DEFAULT_GROUP_ID: &str = "e29ea9f8-b815-4a1b-8a66-478df24cda7d";
pub const DEFAULT_PROXY_BASE: &str = "http://localhost:3000/api/proxy";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

pub const ENV_PROXY_BASE: &str = "XLSUMMARY_PROXY_BASE";
pub const ENV_TIMEOUT_SECS: &str = "XLSUMMARY_TIMEOUT_SECS";
pub const ENV_DEFAULT_GROUP: &str = "XLSUMMARY_DEFAULT_GROUP";

/// Unreserved characters stay literal; everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API proxy, without a trailing slash.
    pub proxy_base: String,
    /// Deadline for the whole round trip.
    pub timeout: Duration,
    pub default_group_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_group_id: DEFAULT_GROUP_ID.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `XLSUMMARY_*` environment variables.
    ///
    /// # Errors
    /// Returns `InvalidRequest` when `XLSUMMARY_TIMEOUT_SECS` is not a
    /// positive number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(base) = non_blank(lookup(ENV_PROXY_BASE)) {
            config = config.with_proxy_base(base);
        }
        if let Some(raw) = non_blank(lookup(ENV_TIMEOUT_SECS)) {
            let timeout = parse_timeout_secs(&raw)
                .map_err(|e| SummaryError::InvalidRequest(format!("{ENV_TIMEOUT_SECS} {e}")))?;
            config = config.with_timeout(timeout);
        }
        if let Some(group) = non_blank(lookup(ENV_DEFAULT_GROUP)) {
            config = config.with_default_group(group);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_proxy_base(mut self, base: impl Into<String>) -> Self {
        self.proxy_base = base.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_default_group(mut self, group: impl Into<String>) -> Self {
        self.default_group_id = group.into();
        self
    }

    /// `group` when it is present and not blank, else the default group.
    #[must_use]
    pub fn resolve_group<'a>(&'a self, group: Option<&'a str>) -> &'a str {
        group
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(&self.default_group_id)
    }

    /// Generation endpoint for one (year, group) pair.
    #[must_use]
    pub fn endpoint_url(&self, academic_year_id: &str, group_id: &str) -> String {
        format!(
            "{}/grading/overall-sheets/generate-year-summary-sheet/{}/group/{}/excel",
            self.proxy_base,
            utf8_percent_encode(academic_year_id, PATH_SEGMENT),
            utf8_percent_encode(group_id, PATH_SEGMENT),
        )
    }
}

/// Name the delivered file is saved under.
#[must_use]
pub fn summary_filename(academic_year_id: &str, group_id: &str) -> String {
    format!("year-summary-{academic_year_id}-group-{group_id}.xlsx")
}

/// Parse a positive, possibly fractional, number of seconds.
///
/// # Errors
/// Returns a message naming the offending input when it is not a number or
/// not positive.
pub fn parse_timeout_secs(raw: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("must be a number, got {raw:?}"))?;
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| format!("must be positive, got {raw:?}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
