use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::alerts::Alerts;
use crate::errors::{AlertsError, Result};
use crate::pagination::{fetch_all, Paginated};

/// How incidents are rolled up under a policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentPreference {
    #[default]
    PerPolicy,
    PerCondition,
    PerConditionAndTarget,
}

/// An alert policy: a named grouping of conditions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertPolicy {
    /// Server-assigned ID, absent on a policy that has not been created yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_preference: Option<IncidentPreference>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AlertPolicy {
    /// Create a policy definition with the default incident preference
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            incident_preference: Some(IncidentPreference::PerPolicy),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Filters for [`Alerts::list_policies`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListPoliciesParams {
    /// Exact policy name to filter by
    #[serde(rename = "filter[name]", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoliciesListResponse {
    #[serde(default)]
    policies: Vec<AlertPolicy>,
}

impl Paginated for PoliciesListResponse {
    type Item = AlertPolicy;

    fn into_items(self) -> Vec<AlertPolicy> {
        self.policies
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PolicyEnvelope {
    policy: AlertPolicy,
}

impl Alerts {
    /// List alert policies, following pagination to the end
    #[instrument(name = "Alerts::list_policies", skip_all)]
    pub async fn list_policies(
        &self,
        params: Option<&ListPoliciesParams>,
    ) -> Result<Vec<AlertPolicy>> {
        let url = self.config.rest_url("alerts_policies.json")?;
        fetch_all::<_, _, PoliciesListResponse>(&self.client, self.pager, url, params).await
    }

    /// Get an alert policy by ID
    ///
    /// The REST API has no by-ID endpoint for policies, so this lists and
    /// scans. The first policy with a matching ID wins; a miss is
    /// [`AlertsError::NotFound`].
    #[instrument(name = "Alerts::get_policy", skip(self))]
    pub async fn get_policy(&self, id: i64) -> Result<AlertPolicy> {
        let policies = self.list_policies(None).await?;

        policies
            .into_iter()
            .find(|policy| policy.id == Some(id))
            .ok_or_else(|| AlertsError::NotFound(format!("no alert policy found with ID {id}")))
    }

    /// Create an alert policy, returning it with server-assigned fields
    #[instrument(name = "Alerts::create_policy", skip_all, fields(name = %policy.name))]
    pub async fn create_policy(&self, policy: AlertPolicy) -> Result<AlertPolicy> {
        let url = self.config.rest_url("alerts_policies.json")?;
        let body = PolicyEnvelope { policy };

        let response = self
            .client
            .post::<(), _, PolicyEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.policy)
    }

    /// Update an existing alert policy
    #[instrument(name = "Alerts::update_policy", skip(self, policy))]
    pub async fn update_policy(&self, id: i64, policy: AlertPolicy) -> Result<AlertPolicy> {
        let url = self.config.rest_url(&format!("alerts_policies/{id}.json"))?;
        let body = PolicyEnvelope { policy };

        let response = self
            .client
            .put::<(), _, PolicyEnvelope>(url, None, &body)
            .await?;

        Ok(response.body.policy)
    }

    /// Delete an alert policy, returning the deleted policy as confirmation
    #[instrument(name = "Alerts::delete_policy", skip(self))]
    pub async fn delete_policy(&self, id: i64) -> Result<Option<AlertPolicy>> {
        let url = self.config.rest_url(&format!("alerts_policies/{id}.json"))?;

        let response = self
            .client
            .delete::<(), PolicyEnvelope>(url, None)
            .await?;

        Ok(response.body.map(|envelope| envelope.policy))
    }
}
