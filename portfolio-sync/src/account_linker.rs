use crate::snaptrade_client::Aggregator;
use crate::snaptrade_client::UserCredentials;
use itertools::Itertools;
use schema::Account;

/// One-time steps that register the user and link a brokerage account to it.
pub struct AccountLinker<'a, A> {
    aggregator: &'a A,
}

impl<'a, A: Aggregator> AccountLinker<'a, A> {
    pub fn new(aggregator: &'a A) -> Self {
        Self { aggregator }
    }

    pub async fn register_user(&self, user_id: &str) -> anyhow::Result<String> {
        let user_secret = self.aggregator.register_user(user_id).await?;
        log::info!("Got user secret: {}", &user_secret);
        log::info!("Store it as SNAPTRADE_USER_SECRET before running any other command");
        Ok(user_secret)
    }

    /// The URL has to be opened in a browser to finish linking.
    pub async fn open_portal(&self, user: &UserCredentials, broker: &str) -> anyhow::Result<String> {
        let url = self.aggregator.login_url(user, broker, false).await?;
        log::info!("Connection portal URL for {}:\n{}", broker, &url);
        Ok(url)
    }

    pub async fn list_accounts(&self, user: &UserCredentials) -> anyhow::Result<Vec<Account>> {
        let accounts = self.aggregator.list_accounts(user).await?;
        if accounts.is_empty() {
            log::warn!("No account linked yet, run `openPortal` to link one");
        }
        for account in &accounts {
            let details = [account.name.as_deref(), account.number.as_deref()]
                .into_iter()
                .flatten()
                .join(", ");
            log::info!("Account ID: {} ({})", &account.id, details);
        }
        Ok(accounts)
    }
}
