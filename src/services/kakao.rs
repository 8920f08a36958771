//! Kakao OAuth login client
//!
//! Builds the authorization URL, exchanges an authorization code for an
//! access token and reads the user's Kakao id and nickname.

use std::time::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;
use crate::config::KakaoConfig;
use crate::utils::errors::{PartyGateError, Result};

/// Identity returned by a successful Kakao login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KakaoIdentity {
    pub kakao_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserMeResponse {
    id: i64,
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    profile: Option<KakaoProfile>,
}

#[derive(Debug, Deserialize)]
struct KakaoProfile {
    nickname: Option<String>,
}

/// Error body of the Kakao auth/API servers
#[derive(Debug, Default, Deserialize)]
struct KakaoErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
}

impl KakaoErrorResponse {
    fn message(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Clone)]
#[derive(Debug)]
pub struct KakaoService {
    client: Client,
    config: KakaoConfig,
    redirect_uri: String,
}

impl KakaoService {
    pub fn new(config: KakaoConfig, redirect_uri: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("PartyGate/1.0")
            .build()?;

        Ok(Self { client, config, redirect_uri })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// URL the browser is sent to for Kakao consent
    pub fn authorize_url(&self, state: Option<&str>) -> Result<String> {
        let mut url = Url::parse(&format!("{}/oauth/authorize", self.config.auth_url.trim_end_matches('/')))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.rest_api_key)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("response_type", "code");
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        Ok(url.into())
    }

    /// Exchange an authorization code and fetch the user's identity
    pub async fn login(&self, code: &str) -> Result<KakaoIdentity> {
        if code.trim().is_empty() {
            return Err(PartyGateError::InvalidInput("Authorization code is required".to_string()));
        }

        let access_token = self.exchange_code(code).await?;
        let identity = self.fetch_identity(&access_token).await?;

        info!(kakao_id = %identity.kakao_id, "Kakao authentication successful");
        Ok(identity)
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let url = format!("{}/oauth/token", self.config.auth_url.trim_end_matches('/'));
        debug!(url = %url, "Exchanging Kakao authorization code");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.rest_api_key.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: KakaoErrorResponse = response.json().await.unwrap_or_default();
            error!(status = %status, message = %body.message(), "Kakao token exchange failed");
            return Err(PartyGateError::Authentication(format!(
                "Failed to exchange authorization code: {}",
                body.message()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<KakaoIdentity> {
        let url = format!("{}/v2/user/me", self.config.api_url.trim_end_matches('/'));

        let response = self.client.get(&url).bearer_auth(access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body: KakaoErrorResponse = response.json().await.unwrap_or_default();
            error!(status = %status, message = %body.message(), "Kakao user info failed");
            return Err(PartyGateError::Authentication(format!(
                "Failed to get user information: {}",
                body.message()
            )));
        }

        let me: UserMeResponse = response.json().await?;
        let name = me
            .kakao_account
            .and_then(|account| account.profile)
            .and_then(|profile| profile.nickname)
            .unwrap_or_default();

        Ok(KakaoIdentity {
            kakao_id: me.id.to_string(),
            name,
        })
    }
}

/// Where the browser goes after the Kakao redirect lands on the callback
pub fn callback_redirect(code: Option<&str>, error: Option<&str>) -> String {
    match (code, error) {
        (_, Some(_)) => "/auth?error=kakao_auth_failed".to_string(),
        (Some(code), None) if !code.is_empty() => format!("/auth?code={}", urlencoding::encode(code)),
        _ => "/auth?error=no_code".to_string(),
    }
}
