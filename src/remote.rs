//! HTTP client for a Memos server.
//!
//! Only what the app needs: page through `GET /api/v1/memos`, create with
//! `POST`, and replace content with `PATCH`. Each request is tried once;
//! failures surface as [`VibitsError::Remote`].

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, VibitsError};
use crate::memo::Memo;

const MEMOS_PATH: &str = "api/v1/memos";

/// A memo as the server returns it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiMemo {
    /// Resource name, e.g. `memos/abc123`.
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl From<ApiMemo> for Memo {
    fn from(api: ApiMemo) -> Self {
        Memo {
            id: memo_id_from_name(&api.name).to_string(),
            content: api.content,
            created_at: api.create_time,
            updated_at: api.update_time,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMemosResponse {
    #[serde(default)]
    pub memos: Vec<ApiMemo>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ListMemosResponse {
    /// The token for the following page, if there is one.
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct MemoContentBody<'a> {
    content: &'a str,
}

/// Trailing path segment of a resource name (`memos/42` → `42`).
pub fn memo_id_from_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

pub struct MemosClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    page_size: usize,
}

impl MemosClient {
    /// Blank URL or token is rejected with [`VibitsError::InvalidCredentials`].
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base_url = base_url.trim();
        let token = token.trim();
        if base_url.is_empty() {
            return Err(VibitsError::InvalidCredentials("server URL is empty".into()));
        }
        if token.is_empty() {
            return Err(VibitsError::InvalidCredentials("access token is empty".into()));
        }

        // a trailing slash keeps Url::join from dropping the last path segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| VibitsError::InvalidCredentials(format!("bad server URL {base_url}: {e}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.to_string(),
            page_size: 200,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn memos_url(&self, page_token: Option<&str>) -> Result<Url> {
        let mut url = self
            .base_url
            .join(MEMOS_PATH)
            .map_err(|e| VibitsError::Remote(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &self.page_size.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    /// Fetch every memo, following page tokens until the server stops
    /// returning one.
    pub async fn list_memos(&self) -> Result<Vec<Memo>> {
        let mut memos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.memos_url(page_token.as_deref())?;
            debug!(%url, "fetching memo page");

            let response = self.http.get(url).bearer_auth(&self.token).send().await?;
            let page: ListMemosResponse = read_json(response).await?;

            let next = page.next_page().map(str::to_string);
            memos.extend(page.memos.into_iter().map(Memo::from));

            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(count = memos.len(), "fetched memos from server");
        Ok(memos)
    }

    pub async fn create_memo(&self, content: &str) -> Result<Memo> {
        let url = self
            .base_url
            .join(MEMOS_PATH)
            .map_err(|e| VibitsError::Remote(e.to_string()))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&MemoContentBody { content })
            .send()
            .await?;
        let created: ApiMemo = read_json(response).await?;
        Ok(created.into())
    }

    /// Replace a memo's content (`PATCH /api/v1/memos/{id}?updateMask=content`).
    pub async fn update_memo(&self, id: &str, content: &str) -> Result<Memo> {
        let url = self.memo_url(id)?;
        let response = self
            .http
            .patch(url)
            .bearer_auth(&self.token)
            .json(&MemoContentBody { content })
            .send()
            .await?;
        let updated: ApiMemo = read_json(response).await?;
        Ok(updated.into())
    }

    pub fn memo_url(&self, id: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("{MEMOS_PATH}/"))
            .and_then(|u| u.join(id))
            .map_err(|e| VibitsError::Remote(e.to_string()))?;
        url.query_pairs_mut().append_pair("updateMask", "content");
        Ok(url)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(VibitsError::InvalidCredentials("server rejected the access token".into()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VibitsError::Remote(format!("HTTP {status}: {body}")));
    }
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_are_rejected() {
        assert!(matches!(
            MemosClient::new("  ", "token"),
            Err(VibitsError::InvalidCredentials(_))
        ));
        assert!(matches!(
            MemosClient::new("https://memos.example.com", ""),
            Err(VibitsError::InvalidCredentials(_))
        ));
        assert!(MemosClient::new("https://memos.example.com", "t").is_ok());
    }

    #[test]
    fn memos_url_keeps_base_path_and_paging() {
        let client = MemosClient::new("https://example.com/memos/", "t")
            .unwrap()
            .with_page_size(50);

        assert_eq!(
            client.memos_url(None).unwrap().as_str(),
            "https://example.com/memos/api/v1/memos?pageSize=50"
        );
        assert_eq!(
            client.memos_url(Some("a b")).unwrap().as_str(),
            "https://example.com/memos/api/v1/memos?pageSize=50&pageToken=a+b"
        );
    }

    #[test]
    fn memo_url_targets_one_memo() {
        let client = MemosClient::new("https://example.com", "t").unwrap();
        assert_eq!(
            client.memo_url("42").unwrap().as_str(),
            "https://example.com/api/v1/memos/42?updateMask=content"
        );
    }

    #[test]
    fn api_memo_maps_to_memo() {
        let json = r#"{
            "memos": [
                {"name": "memos/42", "content": "hi", "createTime": "2024-01-15T08:00:00Z", "updateTime": "2024-01-16T08:00:00Z", "visibility": "PRIVATE"},
                {"name": "plain-id", "content": "bare"}
            ],
            "nextPageToken": ""
        }"#;
        let page: ListMemosResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page(), None);

        let memos: Vec<Memo> = page.memos.into_iter().map(Memo::from).collect();
        assert_eq!(memos[0].id, "42");
        assert_eq!(memos[0].created_at.as_deref(), Some("2024-01-15T08:00:00Z"));
        assert_eq!(memos[0].updated_at.as_deref(), Some("2024-01-16T08:00:00Z"));
        assert_eq!(memos[1].id, "plain-id");
        assert_eq!(memos[1].created_at, None);
    }

    #[test]
    fn next_page_token_is_followed_when_present() {
        let page: ListMemosResponse =
            serde_json::from_str(r#"{"memos": [], "nextPageToken": "p2"}"#).unwrap();
        assert_eq!(page.next_page(), Some("p2"));
    }
}
