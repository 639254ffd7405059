// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Search Console and Indexing API client.
//!
//! Thin request/response layer; report formatting lives with the tools.
//! Site URLs are percent-encoded into path segments, which covers both
//! URL-prefix properties (`https://example.com/`) and domain properties
//! (`sc-domain:example.com`).

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Search Console API client.
#[derive(Clone)]
pub struct SearchConsoleClient {
    http: reqwest::Client,
    base_url: String,
    indexing_url: String,
}

impl Default for SearchConsoleClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchConsoleClient {
    pub fn new() -> Self {
        Self::with_base_urls(
            "https://searchconsole.googleapis.com",
            "https://indexing.googleapis.com",
        )
    }

    /// Client with overridden hosts (tests point these at a local server).
    pub fn with_base_urls(base_url: impl Into<String>, indexing_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            indexing_url: indexing_url.into(),
        }
    }

    /// List properties the account can see.
    pub async fn list_sites(&self, access_token: &str) -> Result<Vec<SiteEntry>, AppError> {
        let url = format!("{}/webmasters/v3/sites", self.base_url);
        let listing: SiteList = self.get_json(&url, access_token).await?;
        Ok(listing.site_entry)
    }

    /// Run a Search Analytics query. Rows come back sorted by clicks
    /// descending unless the query carries an explicit `order_by`.
    pub async fn query_search_analytics(
        &self,
        access_token: &str,
        site_url: &str,
        query: &SearchAnalyticsQuery,
    ) -> Result<Vec<AnalyticsRow>, AppError> {
        let url = format!(
            "{}/webmasters/v3/sites/{}/searchAnalytics/query",
            self.base_url,
            urlencoding::encode(site_url)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(query)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        let result: AnalyticsResponse = self.check_response_json(response).await?;
        Ok(result.rows)
    }

    /// List sitemaps submitted for a property.
    pub async fn list_sitemaps(
        &self,
        access_token: &str,
        site_url: &str,
    ) -> Result<Vec<SitemapEntry>, AppError> {
        let url = format!(
            "{}/webmasters/v3/sites/{}/sitemaps",
            self.base_url,
            urlencoding::encode(site_url)
        );
        let listing: SitemapList = self.get_json(&url, access_token).await?;
        Ok(listing.sitemap)
    }

    /// Submit a sitemap for a property.
    pub async fn submit_sitemap(
        &self,
        access_token: &str,
        site_url: &str,
        feedpath: &str,
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/webmasters/v3/sites/{}/sitemaps/{}",
            self.base_url,
            urlencoding::encode(site_url),
            urlencoding::encode(feedpath)
        );

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        self.check_response(response).await
    }

    /// Inspect a URL's index status.
    pub async fn inspect_url(
        &self,
        access_token: &str,
        site_url: &str,
        inspection_url: &str,
    ) -> Result<InspectionResult, AppError> {
        let url = format!("{}/v1/urlInspection/index:inspect", self.base_url);
        let body = serde_json::json!({
            "inspectionUrl": inspection_url,
            "siteUrl": site_url,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        let result: InspectionResponse = self.check_response_json(response).await?;
        Ok(result.inspection_result)
    }

    /// Ask the Indexing API to recrawl a URL. A 403 means the property is
    /// not enrolled for the Indexing API; callers surface guidance for it.
    pub async fn publish_url_notification(
        &self,
        access_token: &str,
        url_to_index: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/v3/urlNotifications:publish", self.indexing_url);
        let body = serde_json::json!({
            "url": url_to_index,
            "type": "URL_UPDATED",
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        self.check_response(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::GoogleApi(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoogleApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("JSON parse error: {}", e)))
    }
}

/// Search Analytics query request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    pub row_limit: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
}

/// Sort instruction on a Search Analytics query.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBy {
    pub metric: String,
    pub direction: String,
}

impl OrderBy {
    pub fn clicks_descending() -> Self {
        Self {
            metric: "CLICK_COUNT".to_string(),
            direction: "descending".to_string(),
        }
    }
}

/// One row of a Search Analytics response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsRow {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: f64,
}

#[derive(Debug, Deserialize)]
struct AnalyticsResponse {
    #[serde(default)]
    rows: Vec<AnalyticsRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteList {
    #[serde(default)]
    site_entry: Vec<SiteEntry>,
}

/// A Search Console property.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub site_url: String,
    #[serde(default)]
    pub permission_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SitemapList {
    #[serde(default)]
    sitemap: Vec<SitemapEntry>,
}

/// A submitted sitemap. Counters arrive as decimal strings, the JSON
/// convention for int64 fields on Google APIs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub path: String,
    #[serde(default)]
    pub last_submitted: Option<String>,
    #[serde(default)]
    pub is_pending: Option<bool>,
    #[serde(default)]
    pub errors: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
    #[serde(default)]
    pub contents: Vec<SitemapContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapContent {
    #[serde(rename = "type")]
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub submitted: Option<String>,
    #[serde(default)]
    pub indexed: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectionResponse {
    inspection_result: InspectionResult,
}

/// URL Inspection result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResult {
    #[serde(default)]
    pub index_status_result: Option<IndexStatusResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatusResult {
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub coverage_state: Option<String>,
    #[serde(default)]
    pub robots_txt_state: Option<String>,
    #[serde(default)]
    pub indexing_state: Option<String>,
    #[serde(default)]
    pub last_crawl_time: Option<String>,
    #[serde(default)]
    pub page_fetch_state: Option<String>,
    #[serde(default)]
    pub google_canonical: Option<String>,
    #[serde(default)]
    pub user_canonical: Option<String>,
}
