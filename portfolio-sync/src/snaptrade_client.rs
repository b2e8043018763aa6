use crate::clock::Clock;
use crate::request_signer::RequestSigner;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::Url;
use schema::Account;
use schema::LoginRequest;
use schema::LoginResponse;
use schema::Position;
use schema::RegisterUserRequest;
use schema::RegisterUserResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;

const DEFAULT_API_BASE: &str = "https://api.snaptrade.com/api/v1";

/// Identity of an end user registered with the aggregation service.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCredentials {
    pub user_id: String,
    pub user_secret: String,
}

/// Operations of the brokerage aggregation service.
#[mockall::automock]
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Creates the user and returns its secret.
    async fn register_user(&self, user_id: &str) -> anyhow::Result<String>;

    /// Returns the URL of the connection portal for `broker`.
    async fn login_url(
        &self,
        user: &UserCredentials,
        broker: &str,
        immediate_redirect: bool,
    ) -> anyhow::Result<String>;

    async fn list_accounts(&self, user: &UserCredentials) -> anyhow::Result<Vec<Account>>;

    async fn list_positions(
        &self,
        user: &UserCredentials,
        account_id: &str,
    ) -> anyhow::Result<Vec<Position>>;
}

pub struct SnapTradeClient {
    http: Client,
    api_base: String,
    client_id: String,
    signer: RequestSigner,
    clock: Clock,
}

impl SnapTradeClient {
    pub fn new(client_id: &str, consumer_key: &str) -> anyhow::Result<Self> {
        Self::with_api_base(DEFAULT_API_BASE, client_id, consumer_key)
    }

    pub fn with_api_base(
        api_base: &str,
        client_id: &str,
        consumer_key: &str,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("portfolio-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            signer: RequestSigner::new(consumer_key),
            clock: Clock,
        })
    }

    fn endpoint_url(&self, endpoint: &str, user: Option<&UserCredentials>) -> anyhow::Result<Url> {
        let mut params = vec![
            ("clientId", self.client_id.clone()),
            ("timestamp", self.clock.now().timestamp().to_string()),
        ];
        if let Some(user) = user {
            params.push(("userId", user.user_id.clone()));
            params.push(("userSecret", user.user_secret.clone()));
        }
        let url = Url::parse_with_params(&format!("{}/{}", self.api_base, endpoint), &params)?;
        Ok(url)
    }

    async fn send<T>(
        &self,
        method: Method,
        endpoint: &str,
        user: Option<&UserCredentials>,
        content: Option<Value>,
    ) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint, user)?;
        let signature = self
            .signer
            .sign(url.path(), url.query().unwrap_or_default(), content.as_ref())?;
        log::debug!("{} {}", method, url.path());

        let mut request = self.http.request(method, url).header("Signature", signature);
        if let Some(content) = &content {
            request = request.json(content);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!("{}: {}", response.status(), response.text().await?)
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Aggregator for SnapTradeClient {
    async fn register_user(&self, user_id: &str) -> anyhow::Result<String> {
        let content = serde_json::to_value(RegisterUserRequest {
            userId: user_id.to_string(),
        })?;
        let response: RegisterUserResponse = self
            .send(Method::POST, "snapTrade/registerUser", None, Some(content))
            .await
            .context("Failed to register the user")?;
        Ok(response.userSecret)
    }

    async fn login_url(
        &self,
        user: &UserCredentials,
        broker: &str,
        immediate_redirect: bool,
    ) -> anyhow::Result<String> {
        let content = serde_json::to_value(LoginRequest {
            broker: broker.to_string(),
            immediateRedirect: immediate_redirect,
        })?;
        let response: LoginResponse = self
            .send(Method::POST, "snapTrade/login", Some(user), Some(content))
            .await
            .context("Failed to create a connection portal login")?;
        Ok(response.redirectURI)
    }

    async fn list_accounts(&self, user: &UserCredentials) -> anyhow::Result<Vec<Account>> {
        self.send(Method::GET, "accounts", Some(user), None)
            .await
            .context("Failed to list the linked accounts")
    }

    async fn list_positions(
        &self,
        user: &UserCredentials,
        account_id: &str,
    ) -> anyhow::Result<Vec<Position>> {
        let endpoint = format!("accounts/{}/positions", account_id);
        self.send(Method::GET, &endpoint, Some(user), None)
            .await
            .with_context(|| format!("Failed to list positions of account {}", account_id))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn user() -> UserCredentials {
        UserCredentials {
            user_id: "alice".into(),
            user_secret: "s3cr3t".into(),
        }
    }

    #[test]
    fn endpoint_url_for_user() -> anyhow::Result<()> {
        // Given
        let client = SnapTradeClient::new("CLIENT", "key")?;

        // When
        let url = client.endpoint_url("accounts", Some(&user()))?;

        // Then
        assert_eq!("/api/v1/accounts", url.path());
        let query = url.query().unwrap_or_default();
        assert!(query.starts_with("clientId=CLIENT&timestamp="));
        assert!(query.ends_with("&userId=alice&userSecret=s3cr3t"));
        Ok(())
    }

    #[test]
    fn endpoint_url_without_user() -> anyhow::Result<()> {
        let client = SnapTradeClient::with_api_base("http://localhost:8080/api/v1/", "C", "key")?;
        let url = client.endpoint_url("snapTrade/registerUser", None)?;
        assert_eq!("/api/v1/snapTrade/registerUser", url.path());
        assert!(!url.query().unwrap_or_default().contains("userId"));
        Ok(())
    }

    #[test]
    fn endpoint_url_encodes_secret() -> anyhow::Result<()> {
        let client = SnapTradeClient::new("CLIENT", "key")?;
        let user = UserCredentials {
            user_id: "alice".into(),
            user_secret: "a+b/c=".into(),
        };
        let url = client.endpoint_url("accounts", Some(&user))?;
        assert!(url.query().unwrap_or_default().ends_with("userSecret=a%2Bb%2Fc%3D"));
        Ok(())
    }
}
