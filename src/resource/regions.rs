//! Regions
//!
//! Regions are the top level of the Craton inventory hierarchy. Their manager
//! is scoped to the session's project: `project_id` is injected into every
//! create, update and list call.

use super::manager::{Manager, ManagerConfig};
use super::Resource;
use crate::craton::session::Session;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

/// Display labels for region fields, in presentation order
pub const REGION_FIELDS: &[(&str, &str)] = &[
    ("id", "ID"),
    ("project_id", "Project ID"),
    ("name", "Name"),
    ("note", "Note"),
    ("created_at", "Created At"),
    ("updated_at", "Updated At"),
];

/// Representation of a Region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Fields added server-side that this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Region {
    const FIELDS: &'static [(&'static str, &'static str)] = REGION_FIELDS;
}

pub type RegionManager = Manager<Region>;

impl Manager<Region> {
    /// Build the project-scoped region manager
    pub fn regions(session: Arc<Session>, base_url: &Url) -> Self {
        let project_id = session.project_id();
        let config = ManagerConfig::new("region", "regions", "/regions")
            .scope("project_id", Value::from(project_id));
        Manager::new(session, base_url, config)
    }
}
