use crate::config::Settings;
use crate::position_renderer::PositionRenderer;
use crate::row_verifier::RowVerifier;
use crate::sheet_target::SheetTarget;
use crate::sheets_client::Spreadsheet;
use crate::snaptrade_client::Aggregator;
use crate::snaptrade_client::UserCredentials;
use anyhow::Context;
use schema::Row;
use serde_json::Value;

#[cfg(not(test))]
use crate::clock::Clock;
#[cfg(test)]
use crate::clock::MockClock as Clock;

const HEADER_LABEL: &str = "Last Updated";
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %I:%M %p";

/// Copies the positions of one linked account into a spreadsheet tab.
pub struct PositionSyncer<'a, A> {
    aggregator: &'a A,
    spreadsheet: &'a dyn Spreadsheet,
    settings: &'a Settings,
    renderer: PositionRenderer,
    verifier: RowVerifier,
    clock: &'a Clock,
}

#[derive(Debug, PartialEq)]
pub struct SyncReport {
    pub account_id: String,
    pub rows: usize,
    pub timestamp: String,
}

impl<'a, A: Aggregator> PositionSyncer<'a, A> {
    pub fn new(
        aggregator: &'a A,
        spreadsheet: &'a dyn Spreadsheet,
        settings: &'a Settings,
        clock: &'a Clock,
    ) -> Self {
        Self {
            aggregator,
            spreadsheet,
            settings,
            renderer: PositionRenderer,
            verifier: RowVerifier,
            clock,
        }
    }

    /// Nothing in the tab is touched until the new rows are ready.
    /// A failure after the clear leaves the data rows empty.
    pub async fn sync(&self, user: &UserCredentials, verify: bool) -> anyhow::Result<SyncReport> {
        let accounts = self.aggregator.list_accounts(user).await?;
        let account = self.settings.account.select(accounts)?;
        log::info!("Account ID: {}", &account.id);

        let positions = self.aggregator.list_positions(user, &account.id).await?;
        log::debug!("Found {} positions", positions.len());
        let rows: Vec<Row> = self
            .renderer
            .render(&positions)?
            .into_iter()
            .map(Row::from)
            .collect();
        let row_count = rows.len();

        let target = SheetTarget::new(&self.settings.sheet, self.settings.preserve_header);
        self.spreadsheet.clear(&target.clear_range()).await?;
        if !rows.is_empty() {
            self.spreadsheet
                .update(&target.data_anchor(), rows.clone())
                .await?;
        }

        let timestamp = self
            .clock
            .now()
            .with_timezone(&self.settings.time_zone)
            .format(TIMESTAMP_FORMAT)
            .to_string();
        if let Some(header_range) = target.header_range() {
            let header = vec![Value::from(HEADER_LABEL), Value::from(timestamp.as_str())];
            self.spreadsheet
                .update(&header_range, vec![header])
                .await
                .context("Failed to stamp the header row")?;
        }

        if verify {
            let read = self.spreadsheet.read(&target.data_range()).await?;
            self.verifier.verify(&rows, &read)?;
            log::debug!("Verified {} rows in {}", read.len(), target.data_range());
        }

        Ok(SyncReport {
            account_id: account.id,
            rows: row_count,
            timestamp,
        })
    }
}
