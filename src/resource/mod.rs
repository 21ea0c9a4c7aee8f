//! Resource abstraction layer
//!
//! A single generic [`Manager`] gives every Craton entity the same
//! create/get/list/update/delete behaviour. Resource types only describe
//! their envelope keys, base path and display labels.
//!
//! # Architecture
//!
//! - [`manager`] - Generic CRUD manager, envelope decoding and paginated listing
//! - [`regions`] - The `Region` resource and its project-scoped manager
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//!
//! async fn names(client: &craton::Client) -> craton::CratonResult<Vec<String>> {
//!     let regions: Vec<_> = client.regions.list(Default::default()).try_collect().await?;
//!     Ok(regions.into_iter().filter_map(|r| r.name).collect())
//! }
//! ```

pub mod manager;
pub mod regions;

pub use manager::{Fields, Manager, ManagerConfig};
pub use regions::{Region, RegionManager, REGION_FIELDS};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A decoded remote entity
pub trait Resource: DeserializeOwned + Serialize + Send + 'static {
    /// Ordered field name -> display label mapping
    const FIELDS: &'static [(&'static str, &'static str)];

    /// All attributes, including fields this client does not know about
    fn attributes(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Look up a single attribute by name
    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes().remove(name).filter(|v| !v.is_null())
    }
}

/// Render a JSON value for display
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(arr)) => format!("[{} items]", arr.len()),
        Some(Value::Object(_)) => "[object]".to_string(),
    }
}
