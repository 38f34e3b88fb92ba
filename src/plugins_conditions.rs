use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::alerts::Alerts;
use crate::errors::{AlertsError, Result};
use crate::pagination::{fetch_all, Paginated};
use crate::types::ConditionTerm;

/// Plugin targeted by a plugins condition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertPlugin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

/// An alert condition on a plugin-reported metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginsCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runbook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<ConditionTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_function: Option<String>,
    pub plugin: AlertPlugin,
}

#[derive(Debug, Clone, Serialize)]
struct ListPluginsConditionsParams {
    policy_id: i64,
}

#[derive(Debug, Deserialize)]
struct PluginsConditionsListResponse {
    #[serde(default)]
    plugins_conditions: Vec<PluginsCondition>,
}

impl Paginated for PluginsConditionsListResponse {
    type Item = PluginsCondition;

    fn into_items(self) -> Vec<PluginsCondition> {
        self.plugins_conditions
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PluginsConditionEnvelope {
    plugins_condition: PluginsCondition,
}

impl Alerts {
    /// List the plugins conditions attached to a policy
    #[instrument(name = "Alerts::list_plugins_conditions", skip(self))]
    pub async fn list_plugins_conditions(&self, policy_id: i64) -> Result<Vec<PluginsCondition>> {
        let url = self.config.rest_url("alerts_plugins_conditions.json")?;
        let params = ListPluginsConditionsParams { policy_id };
        fetch_all::<_, _, PluginsConditionsListResponse>(
            &self.client,
            self.pager,
            url,
            Some(&params),
        )
        .await
    }

    /// Get a plugins condition by policy and condition ID
    ///
    /// No by-ID endpoint exists; scans the policy's conditions and
    /// returns the first match, or [`AlertsError::NotFound`].
    #[instrument(name = "Alerts::get_plugins_condition", skip(self))]
    pub async fn get_plugins_condition(
        &self,
        policy_id: i64,
        id: i64,
    ) -> Result<PluginsCondition> {
        let conditions = self.list_plugins_conditions(policy_id).await?;

        conditions
            .into_iter()
            .find(|condition| condition.id == Some(id))
            .ok_or_else(|| {
                AlertsError::NotFound(format!(
                    "no condition found for policy {policy_id} and condition ID {id}"
                ))
            })
    }

    /// Create a plugins condition under a policy
    #[instrument(name = "Alerts::create_plugins_condition", skip(self, condition))]
    pub async fn create_plugins_condition(
        &self,
        policy_id: i64,
        condition: PluginsCondition,
    ) -> Result<PluginsCondition> {
        let url = self
            .config
            .rest_url(&format!("alerts_plugins_conditions/policies/{policy_id}.json"))?;
        let body = PluginsConditionEnvelope {
            plugins_condition: condition,
        };

        let response = self
            .client
            .post::<(), _, PluginsConditionEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.plugins_condition)
    }

    /// Update an existing plugins condition
    #[instrument(name = "Alerts::update_plugins_condition", skip(self, condition))]
    pub async fn update_plugins_condition(
        &self,
        id: i64,
        condition: PluginsCondition,
    ) -> Result<PluginsCondition> {
        let url = self
            .config
            .rest_url(&format!("alerts_plugins_conditions/{id}.json"))?;
        let body = PluginsConditionEnvelope {
            plugins_condition: condition,
        };

        let response = self
            .client
            .put::<(), _, PluginsConditionEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.plugins_condition)
    }

    /// Delete a plugins condition, returning the deleted condition echo
    #[instrument(name = "Alerts::delete_plugins_condition", skip(self))]
    pub async fn delete_plugins_condition(&self, id: i64) -> Result<Option<PluginsCondition>> {
        let url = self
            .config
            .rest_url(&format!("alerts_plugins_conditions/{id}.json"))?;

        let response = self
            .client
            .delete::<(), PluginsConditionEnvelope>(url, None)
            .await?;

        Ok(response.body.map(|envelope| envelope.plugins_condition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Region};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_alerts(server: &MockServer) -> Alerts {
        let config = Config::new(Region::US)
            .with_personal_api_key("NRAK-test")
            .with_rest_base_url(Url::parse(&server.uri()).unwrap());
        Alerts::new(config).unwrap()
    }

    fn plugins_condition_json(id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "enabled": true,
            "entities": ["306601"],
            "metric": "Component/Connection/Clients[connections]",
            "value_function": "average",
            "plugin": {"id": "21709", "guid": "net.kenjij.newrelic_redis_plugin"},
            "terms": [{
                "duration": "5",
                "operator": "above",
                "priority": "critical",
                "threshold": "100",
                "time_function": "all"
            }]
        })
    }

    #[tokio::test]
    async fn test_list_plugins_conditions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/alerts_plugins_conditions.json"))
            .and(query_param("policy_id", "111"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plugins_conditions": [plugins_condition_json(5, "Too many clients")]
            })))
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let conditions = alerts.list_plugins_conditions(111).await.unwrap();

        assert_eq!(conditions.len(), 1);
        assert_eq!(
            conditions[0].plugin.guid.as_deref(),
            Some("net.kenjij.newrelic_redis_plugin")
        );
    }

    #[tokio::test]
    async fn test_get_plugins_condition_by_scan() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/alerts_plugins_conditions.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plugins_conditions": [
                    plugins_condition_json(5, "Too many clients"),
                    plugins_condition_json(6, "Memory high")
                ]
            })))
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);

        let condition = alerts.get_plugins_condition(111, 6).await.unwrap();
        assert_eq!(condition.name, "Memory high");

        let missing = alerts.get_plugins_condition(111, 404).await;
        assert!(matches!(missing, Err(AlertsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_plugins_condition() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/alerts_plugins_conditions/policies/111.json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "plugins_condition": plugins_condition_json(5, "Too many clients")
            })))
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let condition: PluginsCondition =
            serde_json::from_value(plugins_condition_json(5, "Too many clients")).unwrap();

        let created = alerts
            .create_plugins_condition(111, condition.clone())
            .await
            .unwrap();

        assert_eq!(created, condition);
    }

    #[tokio::test]
    async fn test_delete_plugins_condition() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/alerts_plugins_conditions/5.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plugins_condition": plugins_condition_json(5, "Too many clients")
            })))
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let deleted = alerts.delete_plugins_condition(5).await.unwrap();

        assert_eq!(deleted.unwrap().id, Some(5));
    }
}
