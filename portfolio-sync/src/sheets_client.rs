use crate::clock::Clock;
use crate::service_account::ServiceAccountKey;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Url;
use schema::Row;
use schema::ValueRange;
use std::path::PathBuf;

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Cell-range operations on one spreadsheet, addressed by A1 ranges such as `Tab!A2:Z`.
#[mockall::automock]
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Reads the values in `range`, with numbers as numbers rather than formatted text.
    async fn read(&self, range: &str) -> anyhow::Result<Vec<Row>>;

    /// Writes `rows` starting at the top-left cell of `range`, parsing values as if typed by a user.
    async fn update(&self, range: &str, rows: Vec<Row>) -> anyhow::Result<()>;

    /// Removes the values in `range`, leaving formatting in place.
    async fn clear(&self, range: &str) -> anyhow::Result<()>;
}

/// Opens an authorized [`Spreadsheet`] handle.
#[mockall::automock]
#[async_trait]
pub trait SpreadsheetConnector: Send + Sync {
    async fn connect(&self, spreadsheet_id: &str) -> anyhow::Result<Box<dyn Spreadsheet>>;
}

pub struct SheetsClient {
    http: Client,
    spreadsheet_url: Url,
    access_token: String,
}

impl SheetsClient {
    pub fn new(http: Client, spreadsheet_id: &str, access_token: String) -> anyhow::Result<Self> {
        let mut spreadsheet_url = Url::parse(DEFAULT_API_BASE)?;
        spreadsheet_url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Spreadsheet API base cannot hold a path"))?
            .push(spreadsheet_id);
        Ok(Self {
            http,
            spreadsheet_url,
            access_token,
        })
    }

    /// URL of `values/<range><action>`, with the range encoded as one path segment.
    fn values_url(&self, range: &str, action: &str) -> anyhow::Result<Url> {
        let mut url = self.spreadsheet_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Spreadsheet URL cannot hold a path"))?
            .push("values")
            .push(&format!("{}{}", range, action));
        Ok(url)
    }

    async fn execute(&self, request: RequestBuilder) -> anyhow::Result<reqwest::Response> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("{}: {}", response.status(), response.text().await?)
        }
        Ok(response)
    }
}

#[async_trait]
impl Spreadsheet for SheetsClient {
    async fn read(&self, range: &str) -> anyhow::Result<Vec<Row>> {
        let mut url = self.values_url(range, "")?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE");
        let value_range: ValueRange = self
            .execute(self.http.get(url))
            .await
            .with_context(|| format!("Failed to read {}", range))?
            .json()
            .await?;
        Ok(value_range.values)
    }

    async fn update(&self, range: &str, rows: Vec<Row>) -> anyhow::Result<()> {
        let mut url = self.values_url(range, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let body = ValueRange {
            range: Some(range.to_string()),
            majorDimension: Some("ROWS".into()),
            values: rows,
        };
        self.execute(self.http.put(url).json(&body))
            .await
            .with_context(|| format!("Failed to write {}", range))?;
        Ok(())
    }

    async fn clear(&self, range: &str) -> anyhow::Result<()> {
        let url = self.values_url(range, ":clear")?;
        self.execute(self.http.post(url).json(&serde_json::json!({})))
            .await
            .with_context(|| format!("Failed to clear {}", range))?;
        Ok(())
    }
}

/// Authorizes with a service-account key file and opens spreadsheets with the resulting token.
pub struct ServiceAccountConnector {
    http: Client,
    key_path: PathBuf,
    clock: Clock,
}

impl ServiceAccountConnector {
    pub fn new(key_path: PathBuf) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("portfolio-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            key_path,
            clock: Clock,
        })
    }
}

#[async_trait]
impl SpreadsheetConnector for ServiceAccountConnector {
    async fn connect(&self, spreadsheet_id: &str) -> anyhow::Result<Box<dyn Spreadsheet>> {
        let key = ServiceAccountKey::load(&self.key_path).await?;
        let access_token = key
            .access_token(&self.http, self.clock.now())
            .await
            .context("Failed to authorize the service account")?;
        let client = SheetsClient::new(self.http.clone(), spreadsheet_id, access_token)?;
        Ok(Box::new(client))
    }
}
