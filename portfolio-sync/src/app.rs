use crate::account_linker::AccountLinker;
use crate::cli::Cli;
use crate::cli::Command;
use crate::config::Config;
use crate::position_syncer::PositionSyncer;
use crate::sheets_client::ServiceAccountConnector;
use crate::sheets_client::SpreadsheetConnector;
use crate::snaptrade_client::Aggregator;
use crate::snaptrade_client::SnapTradeClient;
use anyhow::Context;

#[cfg(not(test))]
use crate::clock::Clock;
#[cfg(test)]
use crate::clock::MockClock as Clock;

/// Runs the operation chosen on the command line.
pub struct App<A, C> {
    command: Command,
    config: Config,
    aggregator: A,
    connector: C,
    clock: Clock,
}

impl App<SnapTradeClient, ServiceAccountConnector> {
    pub fn new(args: Cli, config: Config) -> anyhow::Result<Self> {
        let aggregator = SnapTradeClient::new(
            &config.credentials.client_id,
            &config.credentials.consumer_key,
        )?;
        let connector =
            ServiceAccountConnector::new(config.credentials.service_account_path.clone())?;
        Ok(Self {
            command: args.operation(),
            config,
            aggregator,
            connector,
            clock: Default::default(),
        })
    }
}

impl<A: Aggregator, C: SpreadsheetConnector> App<A, C> {
    pub async fn run(&self) -> anyhow::Result<()> {
        let credentials = &self.config.credentials;
        let linker = AccountLinker::new(&self.aggregator);
        match self.command {
            Command::RegisterUser => {
                linker
                    .register_user(&credentials.user_id)
                    .await
                    .context("registerUser failed")?;
            }
            Command::OpenPortal => {
                let user = credentials.user()?;
                linker
                    .open_portal(&user, &self.config.settings.broker)
                    .await
                    .context("openPortal failed")?;
            }
            Command::ListAccounts => {
                let user = credentials.user()?;
                linker
                    .list_accounts(&user)
                    .await
                    .context("listAccounts failed")?;
            }
            Command::Sync { verify } => self.sync(verify).await.context("sync failed")?,
        }
        Ok(())
    }

    async fn sync(&self, verify: bool) -> anyhow::Result<()> {
        let user = self.config.credentials.user()?;
        let sheet_id = self.config.credentials.sheet_id()?;
        let spreadsheet = self.connector.connect(sheet_id).await?;
        let report = PositionSyncer::new(
            &self.aggregator,
            spreadsheet.as_ref(),
            &self.config.settings,
            &self.clock,
        )
        .sync(&user, verify)
        .await?;
        log::info!(
            "Synced {} positions of account {} at {}",
            report.rows,
            &report.account_id,
            &report.timestamp
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::MockClock;
    use crate::config::Credentials;
    use crate::config::Settings;
    use crate::position_renderer::build_position;
    use crate::sheets_client::MockSpreadsheet;
    use crate::sheets_client::MockSpreadsheetConnector;
    use crate::sheets_client::Spreadsheet;
    use crate::snaptrade_client::MockAggregator;
    use mockall::predicate::*;
    use schema::Account;
    use std::path::PathBuf;

    fn config(user_secret: Option<&str>) -> Config {
        Config {
            credentials: Credentials {
                client_id: "CLIENT".into(),
                consumer_key: "KEY".into(),
                user_id: "alice".into(),
                user_secret: user_secret.map(Into::into),
                sheet_id: Some("sheet-123".into()),
                service_account_path: PathBuf::from("service-account.json"),
            },
            settings: Settings::default(),
        }
    }

    fn app(
        command: Command,
        config: Config,
        aggregator: MockAggregator,
        connector: MockSpreadsheetConnector,
    ) -> App<MockAggregator, MockSpreadsheetConnector> {
        let mut clock = MockClock::default();
        clock.expect_now().returning(chrono::Utc::now);
        App {
            command,
            config,
            aggregator,
            connector,
            clock,
        }
    }

    #[tokio::test]
    async fn register_user_without_spreadsheet() -> anyhow::Result<()> {
        // Given
        let mut aggregator = MockAggregator::default();
        aggregator
            .expect_register_user()
            .with(eq("alice"))
            .times(1)
            .returning(|_| Ok("s3cr3t".into()));
        let mut connector = MockSpreadsheetConnector::default();
        connector.expect_connect().never();

        // When
        app(Command::RegisterUser, config(None), aggregator, connector)
            .run()
            .await?;

        // Then the mocks verify on drop
        Ok(())
    }

    #[tokio::test]
    async fn open_portal_without_spreadsheet() -> anyhow::Result<()> {
        let mut aggregator = MockAggregator::default();
        aggregator
            .expect_login_url()
            .with(always(), eq("FIDELITY"), eq(false))
            .times(1)
            .returning(|_, _, _| Ok("https://app.snaptrade.com/connect".into()));
        let mut connector = MockSpreadsheetConnector::default();
        connector.expect_connect().never();

        app(Command::OpenPortal, config(Some("s3cr3t")), aggregator, connector)
            .run()
            .await
    }

    #[tokio::test]
    async fn open_portal_without_secret() {
        let mut aggregator = MockAggregator::default();
        aggregator.expect_login_url().never();
        let connector = MockSpreadsheetConnector::default();

        let result = app(Command::OpenPortal, config(None), aggregator, connector)
            .run()
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn sync() -> anyhow::Result<()> {
        // Given
        let mut aggregator = MockAggregator::default();
        aggregator.expect_list_accounts().returning(|_| {
            Ok(vec![Account {
                id: "acc-1".into(),
                ..Default::default()
            }])
        });
        aggregator
            .expect_list_positions()
            .returning(|_, _| Ok(vec![build_position("AAPL", 10.0, 150.0)]));
        let mut spreadsheet = MockSpreadsheet::default();
        spreadsheet.expect_clear().times(1).returning(|_| Ok(()));
        spreadsheet.expect_update().times(2).returning(|_, _| Ok(()));
        let mut connector = MockSpreadsheetConnector::default();
        connector
            .expect_connect()
            .with(eq("sheet-123"))
            .times(1)
            .return_once(move |_| Ok(Box::new(spreadsheet) as Box<dyn Spreadsheet>));

        // When
        app(
            Command::Sync { verify: false },
            config(Some("s3cr3t")),
            aggregator,
            connector,
        )
        .run()
        .await
    }

    #[tokio::test]
    async fn sync_when_authorization_fails() {
        // Given
        let mut aggregator = MockAggregator::default();
        aggregator.expect_list_accounts().never();
        let mut connector = MockSpreadsheetConnector::default();
        connector
            .expect_connect()
            .returning(|_| Err(anyhow::anyhow!("invalid_grant")));

        // When
        let error = app(
            Command::Sync { verify: false },
            config(Some("s3cr3t")),
            aggregator,
            connector,
        )
        .run()
        .await
        .unwrap_err();

        // Then
        assert!(format!("{:#}", error).starts_with("sync failed: invalid_grant"));
    }
}
