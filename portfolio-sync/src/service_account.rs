use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use reqwest::Client;
use schema::AccessToken;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The parts of a Google service-account key file needed to obtain access tokens.
#[derive(Deserialize, Debug, PartialEq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read service account key {}", path.display()))?;
        let key = Self::parse(&json)
            .with_context(|| format!("Malformed service account key {}", path.display()))?;
        Ok(key)
    }

    fn claims(&self, now: DateTime<Utc>) -> Claims<'_> {
        let iat = now.timestamp();
        Claims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Signs the RS256 assertion exchanged for an access token.
    pub fn assertion(&self, now: DateTime<Utc>) -> anyhow::Result<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .context("Service account private key is not a valid RSA PEM")?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)?;
        Ok(token)
    }

    /// Trades a freshly signed assertion for a bearer token.
    pub async fn access_token(&self, http: &Client, now: DateTime<Utc>) -> anyhow::Result<String> {
        let assertion = self.assertion(now)?;
        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("{}: {}", response.status(), response.text().await?)
        }
        let token: AccessToken = response.json().await?;
        log::debug!(
            "Authorized {} for {} seconds",
            self.client_email,
            token.expires_in.unwrap_or_default()
        );
        Ok(token.access_token)
    }
}

#[derive(Serialize, Debug, PartialEq)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}
