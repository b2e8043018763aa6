use crate::account_selector::AccountSelector;
use crate::snaptrade_client::UserCredentials;
use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_SERVICE_ACCOUNT_PATH: &str = "service-account.json";

pub struct Config {
    pub credentials: Credentials,
    pub settings: Settings,
}

/// Secrets read from the environment.
#[derive(Debug, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub consumer_key: String,
    pub user_id: String,
    pub user_secret: Option<String>,
    pub sheet_id: Option<String>,
    pub service_account_path: PathBuf,
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Values are trimmed and blank ones count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required =
            |name: &str| optional(name).with_context(|| format!("{} must be set", name));

        Ok(Self {
            client_id: required("SNAPTRADE_CLIENT_ID")?,
            consumer_key: required("SNAPTRADE_CONSUMER_KEY")?,
            user_id: required("SNAPTRADE_USER_ID")?,
            user_secret: optional("SNAPTRADE_USER_SECRET"),
            sheet_id: optional("SHEET_ID"),
            service_account_path: optional("GOOGLE_SERVICE_ACCOUNT")
                .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT_PATH.into())
                .into(),
        })
    }

    /// The registered user; unavailable until `registerUser` has been run and its secret stored.
    pub fn user(&self) -> anyhow::Result<UserCredentials> {
        let user_secret = self
            .user_secret
            .clone()
            .context("SNAPTRADE_USER_SECRET must be set, run `registerUser` to obtain one")?;
        Ok(UserCredentials {
            user_id: self.user_id.clone(),
            user_secret,
        })
    }

    pub fn sheet_id(&self) -> anyhow::Result<&str> {
        self.sheet_id.as_deref().context("SHEET_ID must be set")
    }
}

/// Non-secret behavior, optionally loaded from a YAML file.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Brokerage code passed to the connection portal.
    pub broker: String,

    /// Tab receiving the positions.
    pub sheet: String,

    pub preserve_header: bool,
    pub time_zone: Tz,
    pub account: AccountSelector,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: "FIDELITY".into(),
            sheet: "FidelityRaw".into(),
            preserve_header: true,
            time_zone: chrono_tz::America::New_York,
            account: AccountSelector::First,
        }
    }
}

impl Settings {
    pub fn parse(yaml: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn parse() -> anyhow::Result<()> {
        // Given
        let sample_yaml = r#"
          broker: SCHWAB
          sheet: Schwab Raw
          preserve_header: false
          time_zone: Europe/Zurich
          account:
            name: Individual
        "#;
        let expected_settings = Settings {
            broker: "SCHWAB".into(),
            sheet: "Schwab Raw".into(),
            preserve_header: false,
            time_zone: chrono_tz::Europe::Zurich,
            account: AccountSelector::Name("Individual".into()),
        };

        // When
        let actual_settings = Settings::parse(sample_yaml)?;

        // Then
        assert_eq!(expected_settings, actual_settings);
        Ok(())
    }

    #[test]
    fn parse_defaults() -> anyhow::Result<()> {
        let settings = Settings::parse("sheet: Raw")?;
        assert_eq!(
            Settings {
                sheet: "Raw".into(),
                ..Default::default()
            },
            settings
        );
        Ok(())
    }

    #[test]
    fn parse_first_account() -> anyhow::Result<()> {
        let settings = Settings::parse("account: first")?;
        assert_eq!(AccountSelector::First, settings.account);
        Ok(())
    }

    #[test]
    fn parse_unknown_time_zone() {
        assert!(Settings::parse("time_zone: Mars/Olympus").is_err());
    }

    #[test]
    fn parse_unknown_key() {
        assert!(Settings::parse("preserve_headers: true").is_err());
    }

    #[test]
    fn credentials_trimmed() -> anyhow::Result<()> {
        // Given
        let vars = lookup(&[
            ("SNAPTRADE_CLIENT_ID", " CLIENT \n"),
            ("SNAPTRADE_CONSUMER_KEY", "KEY"),
            ("SNAPTRADE_USER_ID", "alice"),
            ("SNAPTRADE_USER_SECRET", "  "),
            ("SHEET_ID", "sheet-123"),
        ]);

        // When
        let credentials = Credentials::from_lookup(vars)?;

        // Then
        assert_eq!(
            Credentials {
                client_id: "CLIENT".into(),
                consumer_key: "KEY".into(),
                user_id: "alice".into(),
                user_secret: None,
                sheet_id: Some("sheet-123".into()),
                service_account_path: DEFAULT_SERVICE_ACCOUNT_PATH.into(),
            },
            credentials
        );
        Ok(())
    }

    #[test]
    fn credentials_missing_client_id() {
        let error = Credentials::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!("SNAPTRADE_CLIENT_ID must be set", error.to_string());
    }

    #[test]
    fn user_requires_secret() -> anyhow::Result<()> {
        let credentials = Credentials::from_lookup(lookup(&[
            ("SNAPTRADE_CLIENT_ID", "CLIENT"),
            ("SNAPTRADE_CONSUMER_KEY", "KEY"),
            ("SNAPTRADE_USER_ID", "alice"),
        ]))?;
        assert!(credentials.user().is_err());
        assert!(credentials.sheet_id().is_err());
        Ok(())
    }

    #[test]
    fn user() -> anyhow::Result<()> {
        let credentials = Credentials::from_lookup(lookup(&[
            ("SNAPTRADE_CLIENT_ID", "CLIENT"),
            ("SNAPTRADE_CONSUMER_KEY", "KEY"),
            ("SNAPTRADE_USER_ID", "alice"),
            ("SNAPTRADE_USER_SECRET", "s3cr3t"),
            ("GOOGLE_SERVICE_ACCOUNT", "/etc/sync/key.json"),
        ]))?;
        assert_eq!(
            UserCredentials {
                user_id: "alice".into(),
                user_secret: "s3cr3t".into(),
            },
            credentials.user()?
        );
        assert_eq!(PathBuf::from("/etc/sync/key.json"), credentials.service_account_path);
        Ok(())
    }
}
