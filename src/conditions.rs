use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::alerts::Alerts;
use crate::errors::{AlertsError, Result};
use crate::pagination::{fetch_all, Paginated};
use crate::types::ConditionTerm;

/// Product category an alert condition targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    ApmAppMetric,
    ApmKtMetric,
    ApmJvmMetric,
    ServersMetric,
    BrowserMetric,
    MobileMetric,
}

/// User-defined metric settings for a condition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDefined {
    pub metric: String,
    pub value_function: String,
}

/// An alert condition: a rule that opens a violation when a metric
/// crosses one of its term thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub name: String,
    pub enabled: bool,
    /// Entity IDs the condition is scoped to, stringified by the API
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runbook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_close_timer: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<ConditionTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_defined: Option<UserDefined>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_metric: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ListConditionsParams {
    policy_id: i64,
}

#[derive(Debug, Deserialize)]
struct ConditionsListResponse {
    #[serde(default)]
    conditions: Vec<AlertCondition>,
}

impl Paginated for ConditionsListResponse {
    type Item = AlertCondition;

    fn into_items(self) -> Vec<AlertCondition> {
        self.conditions
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ConditionEnvelope {
    condition: AlertCondition,
}

impl Alerts {
    /// List the alert conditions attached to a policy
    #[instrument(name = "Alerts::list_conditions", skip(self))]
    pub async fn list_conditions(&self, policy_id: i64) -> Result<Vec<AlertCondition>> {
        let url = self.config.rest_url("alerts_conditions.json")?;
        let params = ListConditionsParams { policy_id };
        fetch_all::<_, _, ConditionsListResponse>(&self.client, self.pager, url, Some(&params))
            .await
    }

    /// Get an alert condition by policy and condition ID
    ///
    /// The REST API only exposes a list endpoint for conditions, so this
    /// scans the policy's conditions. First match wins; a miss is
    /// [`AlertsError::NotFound`].
    #[instrument(name = "Alerts::get_condition", skip(self))]
    pub async fn get_condition(&self, policy_id: i64, id: i64) -> Result<AlertCondition> {
        let conditions = self.list_conditions(policy_id).await?;

        conditions
            .into_iter()
            .find(|condition| condition.id == Some(id))
            .ok_or_else(|| {
                AlertsError::NotFound(format!(
                    "no condition found for policy {policy_id} and condition ID {id}"
                ))
            })
    }

    /// Create an alert condition under a policy
    #[instrument(name = "Alerts::create_condition", skip(self, condition))]
    pub async fn create_condition(
        &self,
        policy_id: i64,
        condition: AlertCondition,
    ) -> Result<AlertCondition> {
        let url = self
            .config
            .rest_url(&format!("alerts_conditions/policies/{policy_id}.json"))?;
        let body = ConditionEnvelope { condition };

        let response = self
            .client
            .post::<(), _, ConditionEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.condition)
    }

    /// Update an existing alert condition
    #[instrument(name = "Alerts::update_condition", skip(self, condition))]
    pub async fn update_condition(
        &self,
        id: i64,
        condition: AlertCondition,
    ) -> Result<AlertCondition> {
        let url = self
            .config
            .rest_url(&format!("alerts_conditions/{id}.json"))?;
        let body = ConditionEnvelope { condition };

        let response = self
            .client
            .put::<(), _, ConditionEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.condition)
    }

    /// Delete an alert condition, returning the deleted condition echo
    #[instrument(name = "Alerts::delete_condition", skip(self))]
    pub async fn delete_condition(&self, id: i64) -> Result<Option<AlertCondition>> {
        let url = self
            .config
            .rest_url(&format!("alerts_conditions/{id}.json"))?;

        let response = self
            .client
            .delete::<(), ConditionEnvelope>(url, None)
            .await?;

        Ok(response.body.map(|envelope| envelope.condition))
    }
}
