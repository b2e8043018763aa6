use crate::error::SyncError;
use derive_more::Display;
use schema::Account;
use serde::Deserialize;

/// Policy deciding which linked account gets synced.
#[derive(Deserialize, Display, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountSelector {
    /// Whichever account the aggregation service lists first.
    #[default]
    #[display("the first account")]
    First,

    #[display("account ID '{_0}'")]
    Id(String),

    /// Matches the account's display name, ignoring case.
    #[display("account name '{_0}'")]
    Name(String),
}

impl AccountSelector {
    pub fn select(&self, accounts: Vec<Account>) -> Result<Account, SyncError> {
        if accounts.is_empty() {
            return Err(SyncError::NoAccounts);
        }
        let selected = match self {
            Self::First => accounts.into_iter().next(),
            Self::Id(id) => accounts.into_iter().find(|account| &account.id == id),
            Self::Name(name) => accounts.into_iter().find(|account| {
                account
                    .name
                    .as_deref()
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            }),
        };
        selected.ok_or_else(|| SyncError::AccountNotFound(self.clone()))
    }
}
