//! Spotify OAuth authorization-code wrapper.
//!
//! Thin client over the three endpoints the login flow needs: the authorize
//! redirect, the code-for-token exchange and the current-user profile fetch.
//! Spotify's responses are passed through; nothing here interprets playback
//! state.

use anyhow::{bail, Context, Result};
use base64::Engine;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const ME_URL: &str = "https://api.spotify.com/v1/me";

/// Scopes requested at login.
const SCOPE: &str = "user-read-currently-playing user-read-playback-state";

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Clone)]
pub struct SpotifyClient {
    config: SpotifyConfig,
    http: reqwest::Client,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// URL the browser is redirected to for user consent.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&scope={}&redirect_uri={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(SCOPE),
            urlencoding::encode(&self.config.redirect_uri),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let basic = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));
        let response = self
            .http
            .post(TOKEN_URL)
            .header("Authorization", format!("Basic {}", basic))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.config.redirect_uri),
            ])
            .send()
            .await
            .context("Spotify token request failed")?;
        if !response.status().is_success() {
            bail!("Spotify token exchange returned {}", response.status());
        }
        response
            .json::<TokenResponse>()
            .await
            .context("Failed to decode Spotify token response")
    }

    /// Fetch the authenticated user's Spotify profile.
    pub async fn current_user(&self, access_token: &str) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(ME_URL)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .context("Spotify profile request failed")?;
        if !response.status().is_success() {
            bail!("Spotify profile fetch returned {}", response.status());
        }
        response
            .json()
            .await
            .context("Failed to decode Spotify profile")
    }
}

/// Local handle under which a Spotify-authenticated user is stored.
pub fn spotify_handle(spotify_user_id: &str) -> String {
    format!("spotify:{}", spotify_user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SpotifyClient {
        SpotifyClient::new(SpotifyConfig {
            client_id: "my-client".to_string(),
            client_secret: "shh".to_string(),
            redirect_uri: "http://localhost:8080/v1/auth/spotify/callback".to_string(),
        })
    }

    #[test]
    fn authorize_url_carries_scope_and_redirect() {
        let url = client().authorize_url();
        assert!(url.starts_with("https://accounts.spotify.com/authorize?response_type=code"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("user-read-currently-playing%20user-read-playback-state"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fv1%2Fauth%2Fspotify%2Fcallback"
        ));
    }

    #[test]
    fn handle_shape() {
        assert_eq!(spotify_handle("wizzler"), "spotify:wizzler");
    }
}
