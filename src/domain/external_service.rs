//! Configured external services and webhook secret resolution.
//!
//! An [`ExternalService`] is a connection to a code-hosting account. Its
//! configuration blob may declare webhook entries, each binding an
//! organization (and optionally a single repository) to a shared secret.
//! [`SecretResolver`] extracts the candidate secrets an inbound delivery
//! may have been signed with.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported code-hosting platform kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalServiceKind {
    /// GitHub (github.com or GitHub Enterprise).
    GitHub,
}

impl ExternalServiceKind {
    /// Returns the storage discriminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
        }
    }

    /// Parses a storage discriminator, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("github") {
            Some(Self::GitHub)
        } else {
            None
        }
    }
}

impl fmt::Display for ExternalServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured connection to a code-hosting account.
///
/// Owned by the configuration store and read-only from the gateway's
/// point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalService {
    /// Store-assigned identifier.
    pub id: i64,
    /// Platform kind.
    pub kind: ExternalServiceKind,
    /// Operator-facing name.
    pub display_name: String,
    /// Connection configuration blob, including webhook entries under
    /// a `"webhooks"` key.
    pub config: serde_json::Value,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Row update time.
    pub updated_at: DateTime<Utc>,
}

/// A webhook declaration inside an external service config.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEntry {
    /// Organization the webhook is registered for.
    pub org: String,
    /// Single repository the webhook is scoped to, or `None` for the
    /// whole organization.
    #[serde(default)]
    pub repo: Option<String>,
    /// Shared secret the host signs deliveries with.
    pub secret: String,
}

impl WebhookEntry {
    /// Whether this entry's scope covers the repository `full_name`
    /// (`owner/name`), case-insensitively.
    #[must_use]
    pub fn matches_repo(&self, full_name: &str) -> bool {
        let (owner, name) = match full_name.split_once('/') {
            Some(parts) => parts,
            None => (full_name, ""),
        };
        if !self.org.eq_ignore_ascii_case(owner) {
            return false;
        }
        match &self.repo {
            Some(repo) => repo.eq_ignore_ascii_case(name),
            None => true,
        }
    }
}

// Secrets must never reach logs through Debug formatting.
impl fmt::Debug for WebhookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookEntry")
            .field("org", &self.org)
            .field("repo", &self.repo)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// Webhook config section of an external service config blob.
#[derive(Debug, Default, Deserialize)]
struct ConnectionConfig {
    #[serde(default)]
    webhooks: Vec<WebhookEntry>,
}

impl ExternalService {
    /// Extracts the webhook entries declared in this service's config.
    ///
    /// A config blob that fails to parse yields no entries; the service
    /// is then simply not a candidate for any delivery.
    #[must_use]
    pub fn webhooks(&self) -> Vec<WebhookEntry> {
        match serde_json::from_value::<ConnectionConfig>(self.config.clone()) {
            Ok(cfg) => cfg.webhooks,
            Err(err) => {
                tracing::warn!(
                    service_id = self.id,
                    display_name = %self.display_name,
                    error = %err,
                    "unparseable external service config, skipping webhooks"
                );
                Vec::new()
            }
        }
    }
}

/// Resolves the candidate webhook secrets for an inbound delivery.
///
/// Candidates come from every configured service of the delivery's
/// platform kind; entries with empty secrets are skipped. Scope matching
/// against the payload's repository happens after signature
/// verification, because the claimed scope is only known once the
/// payload is parsed.
#[derive(Debug)]
pub struct SecretResolver<'a> {
    services: &'a [ExternalService],
}

impl<'a> SecretResolver<'a> {
    /// Creates a resolver over the given configured services.
    #[must_use]
    pub fn new(services: &'a [ExternalService]) -> Self {
        Self { services }
    }

    /// Returns every webhook entry a delivery of `kind` may have been
    /// signed with.
    #[must_use]
    pub fn candidates(&self, kind: ExternalServiceKind) -> Vec<WebhookEntry> {
        self.services
            .iter()
            .filter(|svc| svc.kind == kind)
            .flat_map(ExternalService::webhooks)
            .filter(|hook| !hook.secret.is_empty())
            .collect()
    }
}
