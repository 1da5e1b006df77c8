use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::api::{SocialApi, Status};
use crate::app::{EbbError, Result};
use crate::config::ApiConfig;
use crate::domain::ActivityId;

/// Error codes that mean the call budget for the current window is spent.
const RATE_LIMIT_CODES: &[i64] = &[88, 185];

/// Error codes that mean the target is gone or hidden from this account.
const INACCESSIBLE_CODES: &[i64] = &[34, 50, 63, 136, 144, 179];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEntry {
    code: i64,
    message: String,
}

pub struct HttpApi {
    client: Client,
    base_url: Url,
    bearer_token: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig, bearer_token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        // Url::join drops the last path segment unless the base ends with '/'.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            bearer_token: bearer_token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        path: &str,
        target: Option<ActivityId>,
    ) -> Result<Response> {
        let response = request.bearer_auth(&self.bearer_token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(path, status, &body, target))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        target: Option<ActivityId>,
    ) -> Result<T> {
        let request = self.client.get(self.endpoint(path)?).query(query);
        let response = self.send(request, path, target).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post(&self, path: &str, query: &[(&str, String)], target: ActivityId) -> Result<()> {
        let request = self.client.post(self.endpoint(path)?).query(query);
        self.send(request, path, Some(target)).await?;
        Ok(())
    }
}

fn page_query(max_id: Option<ActivityId>, count: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![("count", count.to_string())];
    if let Some(max_id) = max_id {
        query.push(("max_id", max_id.to_string()));
    }
    query
}

/// Map a non-success response onto the crate's failure kinds.
pub(crate) fn classify_failure(
    path: &str,
    status: StatusCode,
    body: &str,
    target: Option<ActivityId>,
) -> EbbError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let codes: Vec<i64> = parsed.errors.iter().map(|e| e.code).collect();
    let message = parsed
        .errors
        .first()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || codes.iter().any(|c| RATE_LIMIT_CODES.contains(c))
    {
        return EbbError::RateLimited {
            endpoint: path.to_string(),
        };
    }

    if let Some(id) = target {
        if status == StatusCode::NOT_FOUND || codes.iter().any(|c| INACCESSIBLE_CODES.contains(c)) {
            return EbbError::Inaccessible {
                id,
                reason: message,
            };
        }
    }

    EbbError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl SocialApi for HttpApi {
    async fn user_timeline(&self, max_id: Option<ActivityId>, count: u32) -> Result<Vec<Status>> {
        let mut query = page_query(max_id, count);
        query.push(("include_rts", "true".into()));
        query.push(("trim_user", "true".into()));
        self.get_json("statuses/user_timeline.json", &query, None).await
    }

    async fn favorites(&self, max_id: Option<ActivityId>, count: u32) -> Result<Vec<Status>> {
        let mut query = page_query(max_id, count);
        query.push(("include_entities", "false".into()));
        self.get_json("favorites/list.json", &query, None).await
    }

    async fn show_status(&self, id: ActivityId) -> Result<Status> {
        self.get_json("statuses/show.json", &[("id", id.to_string())], Some(id))
            .await
    }

    async fn create_favorite(&self, id: ActivityId) -> Result<()> {
        self.post("favorites/create.json", &[("id", id.to_string())], id)
            .await
    }

    async fn destroy_favorite(&self, id: ActivityId) -> Result<()> {
        self.post("favorites/destroy.json", &[("id", id.to_string())], id)
            .await
    }

    async fn destroy_status(&self, id: ActivityId) -> Result<()> {
        self.post(&format!("statuses/destroy/{id}.json"), &[], id)
            .await
    }
}
