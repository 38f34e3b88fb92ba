use reqwest_middleware::RequestBuilder;

use crate::config::Config;
use crate::errors::{AlertsError, Result};

/// Header used by the v2 REST API
const API_KEY_HEADER: &str = "Api-Key";
/// Header used by the original REST API and accepted by v2-capable endpoints
const REST_API_KEY_HEADER: &str = "X-Api-Key";

/// Authentication strategy applied to every outgoing request
///
/// Selected once at client construction; the matching credential must be
/// present in [`Config`] or construction fails with
/// [`AlertsError::Configuration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorizer {
    /// Send the REST API key as `X-Api-Key`
    RestApiKey,
    /// Send the personal API key as `Api-Key`
    PersonalApiKey,
    /// Send the personal API key as `Api-Key`, and additionally the REST
    /// API key as `X-Api-Key` when one is configured, so the same client
    /// can talk to endpoints that only accept the older header
    PersonalApiKeyCapableV2,
}

impl Authorizer {
    /// Check that the credential this strategy needs is configured.
    pub fn validate(&self, config: &Config) -> Result<()> {
        match self {
            Authorizer::RestApiKey if config.rest_api_key().is_none() => Err(
                AlertsError::Configuration("REST API key is required but not set".to_string()),
            ),
            Authorizer::PersonalApiKey | Authorizer::PersonalApiKeyCapableV2
                if config.personal_api_key().is_none() =>
            {
                Err(AlertsError::Configuration(
                    "personal API key is required but not set".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Attach the authentication header(s) for this strategy.
    ///
    /// Pure header injection; assumes [`validate`](Self::validate) passed
    /// at construction.
    pub fn apply(&self, config: &Config, request: RequestBuilder) -> RequestBuilder {
        match self {
            Authorizer::RestApiKey => match config.rest_api_key() {
                Some(key) => request.header(REST_API_KEY_HEADER, key),
                None => request,
            },
            Authorizer::PersonalApiKey => match config.personal_api_key() {
                Some(key) => request.header(API_KEY_HEADER, key),
                None => request,
            },
            Authorizer::PersonalApiKeyCapableV2 => {
                let request = match config.personal_api_key() {
                    Some(key) => request.header(API_KEY_HEADER, key),
                    None => request,
                };
                match config.rest_api_key() {
                    Some(key) => request.header(REST_API_KEY_HEADER, key),
                    None => request,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;

    #[test]
    fn test_validate_missing_personal_key() {
        let config = Config::new(Region::US).with_rest_api_key("rest");
        assert!(Authorizer::RestApiKey.validate(&config).is_ok());
        assert!(matches!(
            Authorizer::PersonalApiKey.validate(&config),
            Err(AlertsError::Configuration(_))
        ));
        assert!(matches!(
            Authorizer::PersonalApiKeyCapableV2.validate(&config),
            Err(AlertsError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_missing_rest_key() {
        let config = Config::new(Region::US).with_personal_api_key("personal");
        assert!(matches!(
            Authorizer::RestApiKey.validate(&config),
            Err(AlertsError::Configuration(_))
        ));
        // the v2-capable strategy only requires the personal key
        assert!(Authorizer::PersonalApiKeyCapableV2.validate(&config).is_ok());
    }
}
