//! Craton Client
//!
//! Entry point for API calls: one manager per resource type, all sharing a
//! single session.

use super::session::Session;
use crate::error::{CratonError, CratonResult};
use crate::resource::RegionManager;
use std::sync::Arc;
use url::Url;

/// Main Craton client
pub struct Client {
    session: Arc<Session>,
    base_url: Url,
    pub regions: RegionManager,
}

impl Client {
    /// Create a new client for the service at `base_url`
    pub fn new(session: Session, base_url: &str) -> CratonResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let session = Arc::new(session);

        Ok(Self {
            regions: RegionManager::regions(Arc::clone(&session), &base_url),
            session,
            base_url,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn parse_base_url(raw: &str) -> CratonResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| CratonError::Config(format!("invalid Craton URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CratonError::Config(format!(
            "unsupported scheme '{}' in Craton URL '{}'",
            other, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_shares_session_scope() {
        let session = Session::new(Some("demo".into()), None, 3).unwrap();
        let client = Client::new(session, "http://craton.example.com:8080/v1").unwrap();
        assert_eq!(client.session().project_id(), 3);
        assert_eq!(client.regions.url(), "http://craton.example.com:8080/v1/regions");
        assert_eq!(client.base_url().host_str(), Some("craton.example.com"));
    }

    #[test]
    fn test_rejects_invalid_urls() {
        let session = Session::new(None, None, 1).unwrap();
        assert!(matches!(
            Client::new(session.clone(), "not a url"),
            Err(CratonError::Config(_))
        ));
        assert!(matches!(
            Client::new(session, "ftp://craton.example.com"),
            Err(CratonError::Config(_))
        ));
    }
}
