//! # New Relic Alerts API
//!
//! A Rust client library for the [New Relic Alerts REST API](https://docs.newrelic.com/docs/alerts/)
//! and the Infrastructure Alerts API.
//!
//! ## Features
//!
//! - Typed CRUD operations for alert policies, alert conditions, plugins
//!   conditions and infrastructure conditions
//! - Transparent `Link`-header pagination: list operations return the
//!   complete, ordered result set
//! - Pluggable authentication (personal and REST API keys) selected at
//!   construction
//! - A normalized `NotFound` error, whether the API answered 404 or a
//!   list scan came up empty
//!
//! ## Example
//!
//! ```rust,no_run
//! use newrelic_alerts_api::{Alerts, AlertPolicy, Config, Region};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new(Region::US).with_personal_api_key("NRAK-...");
//!     let alerts = Alerts::new(config)?;
//!
//!     let policy = alerts
//!         .create_policy(AlertPolicy::new("Production latency"))
//!         .await?;
//!
//!     for condition in alerts.list_conditions(policy.id.unwrap()).await? {
//!         println!("{}: enabled={}", condition.name, condition.enabled);
//!     }
//!     Ok(())
//! }
//! ```

mod alerts;
mod auth;
mod client;
mod conditions;
mod config;
mod errors;
mod infrastructure_conditions;
mod pagination;
mod plugins_conditions;
mod policies;
mod types;

pub use alerts::Alerts;
pub use auth::Authorizer;
pub use client::{
    ApiClient, ApiResponse, ErrorEnvelope, InfrastructureErrorEnvelope, RestErrorEnvelope,
};
pub use conditions::{AlertCondition, ConditionType, UserDefined};
pub use config::{Config, Region};
pub use errors::{AlertsError, Result};
pub use infrastructure_conditions::{
    InfrastructureCondition, InfrastructureConditionThreshold, InfrastructureConditionType,
};
pub use pagination::{LinkHeaderPager, Paginated, Paging};
pub use plugins_conditions::{AlertPlugin, PluginsCondition};
pub use policies::{AlertPolicy, IncidentPreference, ListPoliciesParams};
pub use types::{ConditionTerm, TermOperator, TermPriority, TimeFunction};
