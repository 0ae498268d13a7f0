//! HTTP connection to a live org.
//!
//! All requests carry `Authorization: Bearer <token>`. There are no retries and
//! no client-side timeout beyond what the caller configures on the
//! `reqwest::Client` passed to [`RestConnection::with_client`].

use crate::connection::Connection;
use crate::error::{OrgError, Result};
use crate::model::{Identity, SaveError, WriteOutcome};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::RwLock;
use tracing::debug;

pub struct RestConnection {
    http: Client,
    instance_url: String,
    access_token: String,
    api_version: RwLock<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage {
    #[serde(default)]
    records: Vec<Value>,
    #[serde(default = "default_done")]
    done: bool,
    next_records_url: Option<String>,
}

fn default_done() -> bool {
    true
}

#[derive(Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Deserialize)]
struct UserInfo {
    preferred_username: String,
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    organization_id: String,
}

impl RestConnection {
    pub fn new(instance_url: &str, access_token: &str, api_version: &str) -> Self {
        Self::with_client(Client::new(), instance_url, access_token, api_version)
    }

    pub fn with_client(
        http: Client,
        instance_url: &str,
        access_token: &str,
        api_version: &str,
    ) -> Self {
        Self {
            http,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            api_version: RwLock::new(api_version.to_string()),
        }
    }

    /// Switch API version; subsequent calls use it immediately.
    pub fn set_api_version(&self, version: &str) {
        let mut current = self.api_version.write().unwrap_or_else(|e| e.into_inner());
        *current = version.to_string();
    }

    fn absolute(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}{}", self.instance_url, path_or_url)
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(OrgError::Http {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl Connection for RestConnection {
    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn api_version(&self) -> String {
        self.api_version
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn identity(&self) -> Result<Identity> {
        let url = format!("{}/services/oauth2/userinfo", self.instance_url);
        let info: UserInfo = serde_json::from_value(self.get_json(&url).await?)?;
        Ok(Identity {
            username: info.preferred_username,
            user_id: info.user_id,
            organization_id: info.organization_id,
        })
    }

    async fn query(&self, soql: &str) -> Result<Vec<Value>> {
        let url = format!("{}/query", self.data_url());
        debug!(url, "GET query");
        let response = self
            .http
            .get(&url)
            .query(&[("q", soql)])
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;
        let mut page: QueryPage = serde_json::from_value(read_json(response).await?)?;
        let mut records = std::mem::take(&mut page.records);

        while !page.done {
            let Some(next) = page.next_records_url.take() else {
                break;
            };
            page = serde_json::from_value(self.get_json(&self.absolute(&next)).await?)?;
            records.append(&mut page.records);
        }
        Ok(records)
    }

    async fn create(&self, sobject: &str, fields: Value) -> Result<WriteOutcome> {
        let url = format!("{}/sobjects/{}", self.data_url(), sobject);
        debug!(url, sobject, "POST create");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&fields)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            let created: CreateResponse = serde_json::from_str(&body)?;
            return Ok(WriteOutcome::Created { id: created.id });
        }

        // Save failures come back as a 4xx with a list of {errorCode, message}.
        if status == StatusCode::BAD_REQUEST {
            if let Ok(mut errors) = serde_json::from_str::<Vec<SaveError>>(&body) {
                if !errors.is_empty() {
                    return Ok(WriteOutcome::Rejected(errors.swap_remove(0)));
                }
            }
        }
        Err(OrgError::Http {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        debug!(url, "POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}
