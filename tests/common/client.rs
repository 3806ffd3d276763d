//! HTTP client wrapper for end-to-end tests
//!
//! Wraps reqwest with a cookie store so a login carries over to later
//! requests, and provides one method per server endpoint.

use super::constants::*;
use reqwest::multipart;
use reqwest::{Response, StatusCode};
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Creates a client already logged in as the default test user.
    pub async fn authenticated(base_url: &str) -> Self {
        let client = Self::new(base_url);
        let response = client.login(TEST_USER, TEST_PASS).await;
        assert_eq!(response.status(), StatusCode::CREATED, "Login failed");
        client
    }

    /// Creates a client logged in with the given credentials.
    pub async fn authenticated_as(base_url: &str, handle: &str, password: &str) -> Self {
        let client = Self::new(base_url);
        let response = client.login(handle, password).await;
        assert_eq!(response.status(), StatusCode::CREATED, "Login failed");
        client
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn login(&self, handle: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&json!({ "handle": handle, "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    pub async fn upload_track(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        name: Option<&str>,
    ) -> Response {
        let part = multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .expect("Invalid content type");
        let mut form = multipart::Form::new().part("file", part);
        if let Some(name) = name {
            form = form.text("name", name.to_string());
        }

        self.client
            .post(format!("{}/v1/tracks", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    pub async fn list_tracks(&self) -> Response {
        self.client
            .get(format!("{}/v1/tracks", self.base_url))
            .send()
            .await
            .expect("List tracks request failed")
    }

    pub async fn get_track(&self, track_id: i64) -> Response {
        self.client
            .get(format!("{}/v1/tracks/{}", self.base_url, track_id))
            .send()
            .await
            .expect("Get track request failed")
    }

    pub async fn rename_track(&self, track_id: i64, name: &str) -> Response {
        self.client
            .put(format!("{}/v1/tracks/{}", self.base_url, track_id))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Rename track request failed")
    }

    pub async fn delete_track(&self, track_id: i64) -> Response {
        self.client
            .delete(format!("{}/v1/tracks/{}", self.base_url, track_id))
            .send()
            .await
            .expect("Delete track request failed")
    }

    pub async fn search_tracks(&self, query: &str) -> Response {
        self.client
            .get(format!("{}/v1/tracks/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .expect("Search request failed")
    }

    pub async fn transform_track(&self, track_id: i64, styles: &[&str]) -> Response {
        self.client
            .post(format!("{}/v1/tracks/{}/transform", self.base_url, track_id))
            .json(&json!({ "track_id": track_id, "styles": styles }))
            .send()
            .await
            .expect("Transform request failed")
    }

    /// Sends a transform request with an arbitrary JSON body, for testing
    /// validation failures.
    pub async fn transform_track_raw(&self, track_id: i64, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}/v1/tracks/{}/transform", self.base_url, track_id))
            .json(&body)
            .send()
            .await
            .expect("Transform request failed")
    }

    // ========================================================================
    // Transformations
    // ========================================================================

    pub async fn list_transformations(&self) -> Response {
        self.client
            .get(format!("{}/v1/transformations", self.base_url))
            .send()
            .await
            .expect("List transformations request failed")
    }

    pub async fn get_transformation(&self, transformation_id: i64) -> Response {
        self.client
            .get(format!(
                "{}/v1/transformations/{}",
                self.base_url, transformation_id
            ))
            .send()
            .await
            .expect("Get transformation request failed")
    }

    pub async fn download_transformation(&self, transformation_id: i64) -> Response {
        self.client
            .get(format!(
                "{}/v1/transformations/{}/download",
                self.base_url, transformation_id
            ))
            .send()
            .await
            .expect("Download request failed")
    }

    // ========================================================================
    // Jobs
    // ========================================================================

    pub async fn list_jobs(&self) -> Response {
        self.client
            .get(format!("{}/v1/jobs", self.base_url))
            .send()
            .await
            .expect("List jobs request failed")
    }

    pub async fn list_active_jobs(&self) -> Response {
        self.client
            .get(format!("{}/v1/jobs/active", self.base_url))
            .send()
            .await
            .expect("List active jobs request failed")
    }

    pub async fn get_job(&self, job_id: &str) -> Response {
        self.client
            .get(format!("{}/v1/jobs/{}", self.base_url, job_id))
            .send()
            .await
            .expect("Get job request failed")
    }

    pub async fn cancel_job(&self, job_id: &str) -> Response {
        self.client
            .post(format!("{}/v1/jobs/{}/cancel", self.base_url, job_id))
            .send()
            .await
            .expect("Cancel job request failed")
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub async fn profile_stats(&self) -> Response {
        self.client
            .get(format!("{}/v1/profile/stats", self.base_url))
            .send()
            .await
            .expect("Profile stats request failed")
    }

    // ========================================================================
    // Misc
    // ========================================================================

    pub async fn get_statics(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Statics request failed")
    }
}
