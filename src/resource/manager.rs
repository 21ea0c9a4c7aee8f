//! Generic resource manager
//!
//! Handles create/get/list/update/delete against `{base_url}{base_path}`
//! for any [`Resource`], including envelope decoding and marker-based
//! pagination.

use super::Resource;
use crate::craton::session::Session;
use crate::error::{CratonError, CratonResult};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;
use url::Url;

/// Field name -> value mapping used for payloads and list filters
pub type Fields = Map<String, Value>;

/// Query parameter carrying the continuation cursor
const MARKER_PARAM: &str = "marker";

/// Response field holding the next continuation cursor
const NEXT_MARKER_FIELD: &str = "next_marker";

/// Static description of one resource endpoint
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Envelope key for single-entity bodies, e.g. `region`
    pub key: &'static str,
    /// Envelope key for list bodies, e.g. `regions`
    pub collection_key: &'static str,
    /// Path under the service base URL, e.g. `/regions`
    pub base_path: &'static str,
    /// Fields always injected into create/update bodies and list filters.
    /// These take precedence over caller-supplied values.
    pub scope: Fields,
}

impl ManagerConfig {
    pub fn new(key: &'static str, collection_key: &'static str, base_path: &'static str) -> Self {
        Self {
            key,
            collection_key,
            base_path,
            scope: Fields::new(),
        }
    }

    /// Add an always-injected field
    pub fn scope(mut self, field: &str, value: Value) -> Self {
        self.scope.insert(field.to_string(), value);
        self
    }

    /// Merge the scoping fields over `fields`; the scoped value wins
    pub fn apply_scope(&self, mut fields: Fields) -> Fields {
        for (name, value) in &self.scope {
            if let Some(previous) = fields.insert(name.clone(), value.clone()) {
                if &previous != value {
                    tracing::debug!("Overriding caller-supplied {} with scoped value", name);
                }
            }
        }
        fields
    }
}

/// One page of a list response
struct Page<R> {
    items: Vec<R>,
    next_marker: Option<String>,
}

/// CRUD manager for one resource type
pub struct Manager<R> {
    session: Arc<Session>,
    url: String,
    config: ManagerConfig,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Manager<R> {
    pub fn new(session: Arc<Session>, base_url: &Url, config: ManagerConfig) -> Self {
        let url = format!(
            "{}{}",
            base_url.as_str().trim_end_matches('/'),
            config.base_path
        );
        Self {
            session,
            url,
            config,
            _resource: PhantomData,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Collection URL, e.g. `http://craton/v1/regions`
    pub fn url(&self) -> &str {
        &self.url
    }

    fn member_url(&self, id: impl Display) -> String {
        format!("{}/{}", self.url, urlencoding::encode(&id.to_string()))
    }

    fn envelope(&self, fields: Fields) -> Value {
        let mut body = Map::new();
        body.insert(self.config.key.to_string(), Value::Object(fields));
        Value::Object(body)
    }

    /// Create a resource from `fields`
    pub async fn create(&self, fields: Fields) -> CratonResult<R> {
        let body = self.envelope(self.config.apply_scope(fields));
        let response = self.session.post(&self.url, &body).await?;
        decode_entity(self.config.key, response)
    }

    /// Fetch one resource by identifier
    pub async fn get(&self, id: impl Display) -> CratonResult<R> {
        let response = self.session.get(&self.member_url(id), &[]).await?;
        decode_entity(self.config.key, response)
    }

    /// Stream every resource matching `filters`, one page at a time.
    ///
    /// The next page is requested only once the current one is drained and
    /// the stream ends when the service stops returning a marker.
    pub fn list(&self, filters: Fields) -> BoxStream<'_, CratonResult<R>> {
        let query = query_pairs(&self.config.apply_scope(filters));

        // `Some(marker)` means another page is due; `None` means done
        stream::try_unfold(Some(None), move |state: Option<Option<String>>| {
            let query = query.clone();
            async move {
                let Some(marker) = state else {
                    return Ok(None);
                };
                let page = self.fetch_page(query, marker).await?;
                let next = page.next_marker.map(Some);
                Ok::<_, CratonError>(Some((page.items, next)))
            }
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<R, CratonError>)))
        .try_flatten()
        .boxed()
    }

    /// Apply a partial update and return the server's view of the resource
    pub async fn update(&self, id: impl Display, fields: Fields) -> CratonResult<R> {
        let body = self.envelope(self.config.apply_scope(fields));
        let response = self.session.put(&self.member_url(id), &body).await?;
        decode_entity(self.config.key, response)
    }

    /// Delete a resource by identifier
    pub async fn delete(&self, id: impl Display) -> CratonResult<()> {
        self.session.delete(&self.member_url(id)).await?;
        Ok(())
    }

    async fn fetch_page(
        &self,
        mut query: Vec<(String, String)>,
        marker: Option<String>,
    ) -> CratonResult<Page<R>> {
        if let Some(marker) = marker {
            query.push((MARKER_PARAM.to_string(), marker));
        }

        let response = self.session.get(&self.url, &query).await?;
        let (raw_items, next_marker) = match response {
            Value::Array(items) => (items, None),
            Value::Object(mut body) => {
                let Some(Value::Array(items)) = body.remove(self.config.collection_key) else {
                    return Err(CratonError::Decode(format!(
                        "response is missing the '{}' list",
                        self.config.collection_key
                    )));
                };
                let next = match body.remove(NEXT_MARKER_FIELD) {
                    Some(Value::String(s)) if !s.is_empty() => Some(s),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                };
                (items, next)
            }
            other => {
                return Err(CratonError::Decode(format!(
                    "expected a '{}' listing, got {}",
                    self.config.collection_key,
                    json_kind(&other)
                )))
            }
        };

        let items = raw_items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| {
                    CratonError::Decode(format!("malformed '{}' entry: {}", self.config.key, e))
                })
            })
            .collect::<CratonResult<Vec<R>>>()?;

        tracing::debug!(
            "Fetched {} {} (more pages: {})",
            items.len(),
            self.config.collection_key,
            next_marker.is_some()
        );

        Ok(Page { items, next_marker })
    }
}

/// Decode `{key: {...}}` into a resource
fn decode_entity<R: Resource>(key: &str, mut response: Value) -> CratonResult<R> {
    let Some(inner) = response.get_mut(key).map(Value::take) else {
        return Err(CratonError::Decode(format!(
            "response is missing the '{}' key",
            key
        )));
    };
    serde_json::from_value(inner)
        .map_err(|e| CratonError::Decode(format!("malformed '{}': {}", key, e)))
}

/// Encode filters as query parameters, skipping nulls
pub fn query_pairs(fields: &Fields) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((name.clone(), s.clone())),
            other => Some((name.clone(), other.to_string())),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty body",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
