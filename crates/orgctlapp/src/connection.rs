//! # Connection Capability
//!
//! Every operation talks to the org through the [`Connection`] trait. It is a
//! narrow capability: the credentials needed to address and authorize calls,
//! the authenticated identity, and three record-level operations.
//!
//! The core never constructs or mutates a connection. It is handed one by the
//! caller and only reads from it.
//!
//! ## Implementations
//!
//! - [`crate::platform::rest::RestConnection`]: production HTTP client
//! - [`crate::platform::memory::InMemoryOrg`]: in-process org for tests

use crate::error::Result;
use crate::model::{Identity, WriteOutcome};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Connection: Send + Sync {
    fn access_token(&self) -> &str;

    fn instance_url(&self) -> &str;

    /// Current API version (e.g. `"59.0"`). Read on every call, never cached
    /// by callers, so a version bump on the connection is always honored.
    fn api_version(&self) -> String;

    /// The principal this connection is authenticated as.
    async fn identity(&self) -> Result<Identity>;

    /// Run a query and return every matching record.
    async fn query(&self, soql: &str) -> Result<Vec<Value>>;

    /// Create one record. Platform-side refusals come back as
    /// [`WriteOutcome::Rejected`]; only transport failures are `Err`.
    async fn create(&self, sobject: &str, fields: Value) -> Result<WriteOutcome>;

    /// Authorized JSON POST to an absolute URL.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value>;

    /// Base URL of the versioned data API: `{instance}/services/data/v{version}`.
    fn data_url(&self) -> String {
        format!(
            "{}/services/data/v{}",
            self.instance_url().trim_end_matches('/'),
            self.api_version()
        )
    }
}
