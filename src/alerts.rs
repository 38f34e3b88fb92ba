use crate::auth::Authorizer;
use crate::client::{ApiClient, InfrastructureErrorEnvelope, RestErrorEnvelope};
use crate::config::Config;
use crate::errors::Result;
use crate::pagination::LinkHeaderPager;

/// Entry point for the New Relic Alerts APIs
///
/// Wraps one client per service: the core Alerts REST API and the
/// Infrastructure Alerts API, which differ in base URL and error payload
/// shape. Both are bound to their authorizer and error envelope at
/// construction and are immutable afterwards.
///
/// Resource operations (policies, conditions, plugins conditions,
/// infrastructure conditions) live in `impl Alerts` blocks in their own
/// modules.
///
/// # Example
///
/// ```rust,no_run
/// use newrelic_alerts_api::{Alerts, Config, Region};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::new(Region::US).with_personal_api_key("NRAK-...");
///     let alerts = Alerts::new(config)?;
///
///     for policy in alerts.list_policies(None).await? {
///         println!("{}", policy.name);
///     }
///     Ok(())
/// }
/// ```
pub struct Alerts {
    pub(crate) client: ApiClient<RestErrorEnvelope>,
    pub(crate) infra_client: ApiClient<InfrastructureErrorEnvelope>,
    pub(crate) config: Config,
    pub(crate) pager: LinkHeaderPager,
}

impl Alerts {
    /// Create an Alerts client from a configuration
    ///
    /// # Errors
    ///
    /// Returns [`crate::AlertsError::Configuration`] when the personal API
    /// key is missing, and [`crate::AlertsError::BuildHttpClient`] when
    /// the underlying HTTP client cannot be built. This is the only place
    /// credentials are checked; individual calls assume a valid setup.
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(config.clone(), Authorizer::PersonalApiKeyCapableV2)?;
        let infra_client = ApiClient::new(config.clone(), Authorizer::PersonalApiKeyCapableV2)?;

        Ok(Self {
            client,
            infra_client,
            config,
            pager: LinkHeaderPager,
        })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;
    use crate::errors::AlertsError;

    #[test]
    fn test_new_requires_personal_api_key() {
        let result = Alerts::new(Config::new(Region::US));
        assert!(matches!(result, Err(AlertsError::Configuration(_))));
    }

    #[test]
    fn test_new_with_personal_api_key() {
        let config = Config::new(Region::US).with_personal_api_key("NRAK-test");
        let alerts = Alerts::new(config).unwrap();
        assert_eq!(alerts.config().region(), Region::US);
    }
}
