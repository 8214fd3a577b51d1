//! HTTP client for the hosted activities backend.
//!
//! This module provides:
//! - PostgREST queries against the `activities` table
//! - Public storage URL resolution for activity images
//! - An error-swallowing wrapper for screens that must never fail to render
//!
//! The client is constructed once by the app and passed to whoever needs it;
//! there is no process-wide instance.

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{Activity, OutAbtError, Result};

// Environment variables holding the backend location and anonymous key
const URL_ENV: &str = "EXPO_PUBLIC_SUPABASE_URL";
const ANON_KEY_ENV: &str = "EXPO_PUBLIC_SUPABASE_ANON_KEY";

// Placeholders used when the environment is incomplete, so startup never fails
const DUMMY_URL: &str = "https://dummy.supabase.co";
const DUMMY_KEY: &str = "dummy-key";

const ACTIVITIES_TABLE: &str = "activities";
const DEFAULT_IMAGES_BUCKET: &str = "images";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project base URL, without a trailing slash
    pub url: String,
    /// Anonymous (public) API key
    pub anon_key: String,
    /// Storage bucket holding activity images
    pub images_bucket: String,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            images_bucket: DEFAULT_IMAGES_BUCKET.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    /// Read the backend location from the environment.
    ///
    /// Missing variables are logged and replaced with a placeholder backend,
    /// so requests fail later (and degrade to empty lists) instead of the app
    /// failing at launch.
    pub fn from_env() -> Self {
        Self::from_values(std::env::var(URL_ENV).ok(), std::env::var(ANON_KEY_ENV).ok())
    }

    fn from_values(url: Option<String>, anon_key: Option<String>) -> Self {
        match (url.filter(|u| !u.is_empty()), anon_key.filter(|k| !k.is_empty())) {
            (Some(url), Some(key)) => Self::new(&url, &key),
            (url, key) => {
                error!(
                    "Missing backend environment variables! URL: {}, Key: {}",
                    url.as_deref().unwrap_or("missing"),
                    if key.is_some() { "present (hidden)" } else { "missing" }
                );
                Self::new(DUMMY_URL, DUMMY_KEY)
            }
        }
    }

    /// Whether this is the placeholder configuration.
    pub fn is_placeholder(&self) -> bool {
        self.url == DUMMY_URL
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }
}

/// Public URL for an image stored in the images bucket.
///
/// Returns `None` for an absent or empty path. Leading slashes and a leading
/// `photos/` folder are stripped, since files live at the bucket root.
pub fn public_image_url(config: &BackendConfig, path: Option<&str>) -> Option<String> {
    let path = path?.trim_start_matches('/');
    let cleaned = path.strip_prefix("photos/").unwrap_or(path);
    if cleaned.is_empty() {
        return None;
    }
    Some(format!(
        "{}/storage/v1/object/public/{}/{}",
        config.url, config.images_bucket, cleaned
    ))
}

/// Client for the activities table.
#[derive(Debug, Clone)]
pub struct ActivityClient {
    client: Client,
    config: BackendConfig,
}

impl ActivityClient {
    /// Create a client for the given backend.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OutAbtError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// All activities, most recently created first.
    pub async fn get_activities(&self) -> Result<Vec<Activity>> {
        let start = Instant::now();
        let activities = self
            .select(&[("order", "created_at.desc".to_string())])
            .await?;

        info!(
            "[ActivityClient] Fetched {} activities in {:.2}s",
            activities.len(),
            start.elapsed().as_secs_f64()
        );
        if let Some(first) = activities.first() {
            debug!(
                "[ActivityClient] First activity: {:?} images={:?} image_url={:?}",
                first.name, first.images, first.image_url
            );
        }
        Ok(activities)
    }

    /// Activities with an exact stored category, best rated first.
    pub async fn get_activities_by_category(&self, category: &str) -> Result<Vec<Activity>> {
        self.select(&[
            ("category", format!("eq.{}", category)),
            ("order", "rating.desc".to_string()),
        ])
        .await
    }

    /// A single activity, or `None` if no row has this id.
    pub async fn get_activity_by_id(&self, id: i64) -> Result<Option<Activity>> {
        let mut rows = self
            .select(&[("id", format!("eq.{}", id)), ("limit", "1".to_string())])
            .await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Server-side case-insensitive search over name and description.
    pub async fn search_activities(&self, term: &str) -> Result<Vec<Activity>> {
        self.select(&[("or", search_filter(term))]).await
    }

    /// Activities whose price range overlaps `[min_price, max_price]`, cheapest first.
    pub async fn get_activities_by_price_range(
        &self,
        min_price: f64,
        max_price: f64,
    ) -> Result<Vec<Activity>> {
        self.select(&[
            ("price_max", format!("gte.{}", min_price)),
            ("price_min", format!("lte.{}", max_price)),
            ("order", "price_min.asc".to_string()),
        ])
        .await
    }

    /// Activities of a stored type, best rated first.
    pub async fn get_activities_by_type(&self, activity_type: &str) -> Result<Vec<Activity>> {
        self.select(&[
            ("type", format!("eq.{}", activity_type)),
            ("order", "rating.desc".to_string()),
        ])
        .await
    }

    /// Run a `select=*` query and resolve image URLs on every row.
    async fn select(&self, filters: &[(&str, String)]) -> Result<Vec<Activity>> {
        let request = self
            .authorized(self.client.get(self.config.table_url(ACTIVITIES_TABLE)))
            .query(&[("select", "*")])
            .query(filters);

        let rows: Vec<Activity> = send_json(request).await?;
        Ok(rows
            .into_iter()
            .map(|activity| self.with_image_url(activity))
            .collect())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.config.anon_key))
    }

    fn with_image_url(&self, mut activity: Activity) -> Activity {
        activity.image_url = public_image_url(&self.config, activity.images.as_deref());
        activity
    }
}

/// PostgREST `or` filter matching `term` in name or description.
fn search_filter(term: &str) -> String {
    // Reserved characters in PostgREST filter values
    let term: String = term
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')'))
        .collect();
    format!("(name.ilike.*{0}*,description.ilike.*{0}*)", term.trim())
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(|e| OutAbtError::Http {
        message: e.to_string(),
        status_code: e.status().map(|s| s.as_u16()),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OutAbtError::Http {
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
            status_code: Some(status.as_u16()),
        });
    }

    response.json::<T>().await.map_err(|e| OutAbtError::Decode {
        message: e.to_string(),
    })
}

/// Fetch all activities, treating any failure as "no activities".
pub async fn fetch_or_empty(client: &ActivityClient) -> Vec<Activity> {
    match client.get_activities().await {
        Ok(activities) => activities,
        Err(e) => {
            warn!("[ActivityClient] Error fetching activities: {}", e);
            Vec::new()
        }
    }
}
