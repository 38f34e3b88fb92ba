use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::alerts::Alerts;
use crate::errors::Result;
use crate::pagination::{fetch_all, Paginated};
use crate::types::{TermOperator, TimeFunction};

/// Kind of infrastructure condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureConditionType {
    InfraMetric,
    InfraProcessRunning,
    InfraHostNotReporting,
}

/// Threshold of an infrastructure condition
///
/// Unlike the REST API's [`crate::ConditionTerm`], infrastructure
/// thresholds carry plain JSON numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureConditionThreshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(rename = "duration_minutes")]
    pub duration: i64,
    #[serde(
        rename = "time_function",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub time_function: Option<TimeFunction>,
}

/// An alert condition evaluated by the Infrastructure service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfrastructureCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub condition_type: InfrastructureConditionType,
    pub name: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<TermOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_threshold: Option<InfrastructureConditionThreshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<InfrastructureConditionThreshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_where_clause: Option<String>,
    /// Integration filter, opaque to this client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runbook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_close_timer: Option<i64>,
    #[serde(
        rename = "created_at_epoch_millis",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "updated_at_epoch_millis",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
struct ListInfrastructureConditionsParams {
    policy_id: i64,
}

#[derive(Debug, Deserialize)]
struct InfrastructureConditionsListResponse {
    #[serde(default)]
    data: Vec<InfrastructureCondition>,
}

impl Paginated for InfrastructureConditionsListResponse {
    type Item = InfrastructureCondition;

    fn into_items(self) -> Vec<InfrastructureCondition> {
        self.data
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct InfrastructureConditionEnvelope {
    data: InfrastructureCondition,
}

impl Alerts {
    /// List the infrastructure conditions attached to a policy
    #[instrument(name = "Alerts::list_infrastructure_conditions", skip(self))]
    pub async fn list_infrastructure_conditions(
        &self,
        policy_id: i64,
    ) -> Result<Vec<InfrastructureCondition>> {
        let url = self.config.infrastructure_url("alerts/conditions")?;
        let params = ListInfrastructureConditionsParams { policy_id };
        fetch_all::<_, _, InfrastructureConditionsListResponse>(
            &self.infra_client,
            self.pager,
            url,
            Some(&params),
        )
        .await
    }

    /// Get an infrastructure condition by ID
    ///
    /// The Infrastructure API has a true by-ID endpoint; a missing
    /// condition surfaces as [`crate::AlertsError::NotFound`], same as
    /// the list-scan resources.
    #[instrument(name = "Alerts::get_infrastructure_condition", skip(self))]
    pub async fn get_infrastructure_condition(&self, id: i64) -> Result<InfrastructureCondition> {
        let url = self
            .config
            .infrastructure_url(&format!("alerts/conditions/{id}"))?;

        let response = self
            .infra_client
            .get::<(), InfrastructureConditionEnvelope>(url, None)
            .await?;

        Ok(response.body.data)
    }

    /// Create an infrastructure condition
    #[instrument(name = "Alerts::create_infrastructure_condition", skip(self, condition))]
    pub async fn create_infrastructure_condition(
        &self,
        condition: InfrastructureCondition,
    ) -> Result<InfrastructureCondition> {
        let url = self.config.infrastructure_url("alerts/conditions")?;
        let body = InfrastructureConditionEnvelope { data: condition };

        let response = self
            .infra_client
            .post::<(), _, InfrastructureConditionEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.data)
    }

    /// Update an existing infrastructure condition
    #[instrument(name = "Alerts::update_infrastructure_condition", skip(self, condition))]
    pub async fn update_infrastructure_condition(
        &self,
        id: i64,
        condition: InfrastructureCondition,
    ) -> Result<InfrastructureCondition> {
        let url = self
            .config
            .infrastructure_url(&format!("alerts/conditions/{id}"))?;
        let body = InfrastructureConditionEnvelope { data: condition };

        let response = self
            .infra_client
            .put::<(), _, InfrastructureConditionEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.data)
    }

    /// Delete an infrastructure condition
    ///
    /// The Infrastructure API returns an empty body on delete, so there
    /// is no deletion echo to return.
    #[instrument(name = "Alerts::delete_infrastructure_condition", skip(self))]
    pub async fn delete_infrastructure_condition(&self, id: i64) -> Result<()> {
        let url = self
            .config
            .infrastructure_url(&format!("alerts/conditions/{id}"))?;

        self.infra_client
            .delete::<(), serde_json::Value>(url, None)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Region};
    use crate::errors::AlertsError;
    use chrono::TimeZone;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMESTAMP_MS: i64 = 1_575_438_237_690;

    fn mock_alerts(server: &MockServer) -> Alerts {
        let config = Config::new(Region::US)
            .with_personal_api_key("NRAK-test")
            .with_infrastructure_base_url(Url::parse(&server.uri()).unwrap());
        Alerts::new(config).unwrap()
    }

    fn condition_json() -> serde_json::Value {
        json!({
            "type": "infra_process_running",
            "name": "Java is running",
            "enabled": true,
            "where_clause": "(hostname LIKE '%cassandra%')",
            "id": 13890,
            "created_at_epoch_millis": TIMESTAMP_MS,
            "updated_at_epoch_millis": TIMESTAMP_MS,
            "policy_id": 111111,
            "comparison": "equal",
            "critical_threshold": {
                "value": 12.3,
                "duration_minutes": 6,
                "time_function": "all"
            },
            "warning_threshold": {
                "value": 10.0,
                "duration_minutes": 6,
                "time_function": "all"
            },
            "process_where_clause": "(commandName = 'java')"
        })
    }

    fn test_condition() -> InfrastructureCondition {
        let timestamp = Utc.timestamp_millis_opt(TIMESTAMP_MS).unwrap();
        InfrastructureCondition {
            id: Some(13890),
            condition_type: InfrastructureConditionType::InfraProcessRunning,
            name: "Java is running".to_string(),
            enabled: true,
            policy_id: Some(111111),
            comparison: Some(TermOperator::Equal),
            critical_threshold: Some(InfrastructureConditionThreshold {
                value: Some(12.3),
                duration: 6,
                time_function: Some(TimeFunction::All),
            }),
            warning_threshold: Some(InfrastructureConditionThreshold {
                value: Some(10.0),
                duration: 6,
                time_function: Some(TimeFunction::All),
            }),
            where_clause: Some("(hostname LIKE '%cassandra%')".to_string()),
            process_where_clause: Some("(commandName = 'java')".to_string()),
            filter: None,
            integration_provider: None,
            select_value: None,
            event_type: None,
            runbook_url: None,
            violation_close_timer: None,
            created_at: Some(timestamp),
            updated_at: Some(timestamp),
        }
    }

    #[tokio::test]
    async fn test_list_infrastructure_conditions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/alerts/conditions"))
            .and(query_param("policy_id", "111111"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [condition_json()]})),
            )
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let conditions = alerts.list_infrastructure_conditions(111111).await.unwrap();

        assert_eq!(conditions, vec![test_condition()]);
    }

    #[tokio::test]
    async fn test_get_infrastructure_condition() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/alerts/conditions/13890"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": condition_json()})),
            )
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let condition = alerts.get_infrastructure_condition(13890).await.unwrap();

        assert_eq!(condition.id, Some(13890));
        assert_eq!(condition.name, "Java is running");
        assert_eq!(condition, test_condition());
    }

    #[tokio::test]
    async fn test_get_infrastructure_condition_404_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/alerts/conditions/999"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": {"title": "not found"}})),
            )
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let result = alerts.get_infrastructure_condition(999).await;

        assert!(matches!(result, Err(AlertsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_infrastructure_condition_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/alerts/conditions"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"data": condition_json()})),
            )
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let created = alerts
            .create_infrastructure_condition(test_condition())
            .await
            .unwrap();

        assert_eq!(created, test_condition());
    }

    #[tokio::test]
    async fn test_update_infrastructure_condition() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/alerts/conditions/13890"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": condition_json()})),
            )
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let updated = alerts
            .update_infrastructure_condition(13890, test_condition())
            .await
            .unwrap();

        assert_eq!(updated.id, Some(13890));
    }

    #[tokio::test]
    async fn test_delete_infrastructure_condition_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/alerts/conditions/13890"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let result = alerts.delete_infrastructure_condition(13890).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_infrastructure_error_envelope_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/alerts/conditions/13890"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"errors": [{"status": 400, "detail": "bad filter"}]})),
            )
            .mount(&mock_server)
            .await;

        let alerts = mock_alerts(&mock_server);
        let result = alerts.get_infrastructure_condition(13890).await;

        match result {
            Err(AlertsError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad filter");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
