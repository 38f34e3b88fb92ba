use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::{AlertsError, Result};

const US_REST_BASE_URL: &str = "https://api.newrelic.com/v2/";
const EU_REST_BASE_URL: &str = "https://api.eu.newrelic.com/v2/";
const US_INFRASTRUCTURE_BASE_URL: &str = "https://infra-api.newrelic.com/v2/";
const EU_INFRASTRUCTURE_BASE_URL: &str = "https://infra-api.eu.newrelic.com/v2/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// New Relic data center region
///
/// Selects the base URLs for the REST and Infrastructure APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    US,
    EU,
}

impl Region {
    fn rest_base(&self) -> &'static str {
        match self {
            Region::US => US_REST_BASE_URL,
            Region::EU => EU_REST_BASE_URL,
        }
    }

    fn infrastructure_base(&self) -> &'static str {
        match self {
            Region::US => US_INFRASTRUCTURE_BASE_URL,
            Region::EU => EU_INFRASTRUCTURE_BASE_URL,
        }
    }
}

impl FromStr for Region {
    type Err = AlertsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(Region::US),
            "eu" => Ok(Region::EU),
            other => Err(AlertsError::Configuration(format!(
                "unknown region {other:?}, expected \"US\" or \"EU\""
            ))),
        }
    }
}

/// Client configuration
///
/// Carries the region, credentials and request timeout. Credentials are
/// read at construction of [`crate::Alerts`] and never change afterwards.
///
/// # Example
///
/// ```rust
/// use newrelic_alerts_api::{Config, Region};
///
/// let config = Config::new(Region::US)
///     .with_personal_api_key("NRAK-...")
///     .with_rest_api_key("abc123");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    region: Region,
    personal_api_key: Option<String>,
    rest_api_key: Option<String>,
    timeout: Option<Duration>,
    rest_base_override: Option<Url>,
    infrastructure_base_override: Option<Url>,
}

impl Config {
    /// Create a configuration for the given region
    pub fn new(region: Region) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }

    /// Set the personal API key (`Api-Key` header)
    pub fn with_personal_api_key(mut self, key: impl Into<String>) -> Self {
        self.personal_api_key = Some(key.into());
        self
    }

    /// Set the REST API key (`X-Api-Key` header)
    pub fn with_rest_api_key(mut self, key: impl Into<String>) -> Self {
        self.rest_api_key = Some(key.into());
        self
    }

    /// Set the per-request timeout (default 30s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the REST API base URL
    ///
    /// Takes precedence over the region's default; mainly useful for
    /// pointing the client at a mock server.
    pub fn with_rest_base_url(mut self, url: Url) -> Self {
        self.rest_base_override = Some(url);
        self
    }

    /// Override the Infrastructure API base URL
    pub fn with_infrastructure_base_url(mut self, url: Url) -> Self {
        self.infrastructure_base_override = Some(url);
        self
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn personal_api_key(&self) -> Option<&str> {
        self.personal_api_key.as_deref()
    }

    pub fn rest_api_key(&self) -> Option<&str> {
        self.rest_api_key.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Resolve a REST API path to a full URL
    pub fn rest_url(&self, path: &str) -> Result<Url> {
        let base = match &self.rest_base_override {
            Some(url) => url.clone(),
            None => Url::parse(self.region.rest_base())
                .map_err(|e| AlertsError::Configuration(e.to_string()))?,
        };
        join(&base, path)
    }

    /// Resolve an Infrastructure API path to a full URL
    pub fn infrastructure_url(&self, path: &str) -> Result<Url> {
        let base = match &self.infrastructure_base_override {
            Some(url) => url.clone(),
            None => Url::parse(self.region.infrastructure_base())
                .map_err(|e| AlertsError::Configuration(e.to_string()))?,
        };
        join(&base, path)
    }
}

// Url::join treats the last path segment of a base without a trailing
// slash as a file and drops it, so normalize both sides.
fn join(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| AlertsError::Configuration(format!("invalid URL path {path:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_str() {
        assert_eq!("us".parse::<Region>().unwrap(), Region::US);
        assert_eq!("EU".parse::<Region>().unwrap(), Region::EU);
        assert!(matches!(
            "mars".parse::<Region>(),
            Err(AlertsError::Configuration(_))
        ));
    }

    #[test]
    fn test_rest_url_per_region() {
        let config = Config::new(Region::US);
        assert_eq!(
            config.rest_url("alerts_policies.json").unwrap().as_str(),
            "https://api.newrelic.com/v2/alerts_policies.json"
        );

        let config = Config::new(Region::EU);
        assert_eq!(
            config.rest_url("/alerts_policies.json").unwrap().as_str(),
            "https://api.eu.newrelic.com/v2/alerts_policies.json"
        );
    }

    #[test]
    fn test_infrastructure_url() {
        let config = Config::new(Region::US);
        assert_eq!(
            config
                .infrastructure_url("alerts/conditions/13890")
                .unwrap()
                .as_str(),
            "https://infra-api.newrelic.com/v2/alerts/conditions/13890"
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = Config::new(Region::US)
            .with_rest_base_url(Url::parse("http://localhost:9999/v2").unwrap());
        assert_eq!(
            config.rest_url("alerts_policies.json").unwrap().as_str(),
            "http://localhost:9999/v2/alerts_policies.json"
        );
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(Config::default().timeout(), Duration::from_secs(30));
        assert_eq!(
            Config::new(Region::US)
                .with_timeout(Duration::from_secs(5))
                .timeout(),
            Duration::from_secs(5)
        );
    }
}
