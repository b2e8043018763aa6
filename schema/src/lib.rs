//! Wire types exchanged with the brokerage aggregation service and the spreadsheet service.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// One spreadsheet row as sent to or read from the spreadsheet service.
pub type Row = Vec<Value>;

#[derive(Serialize, Debug, PartialEq)]
#[allow(non_snake_case)]
pub struct RegisterUserRequest {
    pub userId: String,
}

#[derive(Deserialize, Debug, PartialEq)]
#[allow(non_snake_case)]
pub struct RegisterUserResponse {
    pub userId: Option<String>,
    pub userSecret: String,
}

#[derive(Serialize, Debug, PartialEq)]
#[allow(non_snake_case)]
pub struct LoginRequest {
    pub broker: String,
    pub immediateRedirect: bool,
}

#[derive(Deserialize, Debug, PartialEq)]
#[allow(non_snake_case)]
pub struct LoginResponse {
    pub redirectURI: String,
    pub sessionId: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
pub struct Account {
    pub id: String,
    pub name: Option<String>,
    pub number: Option<String>,
}

/// A holding as reported by the aggregation service.
///
/// Every field is optional on the wire; a usable position has all three.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
pub struct Position {
    pub symbol: Option<PositionSymbol>,
    pub units: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
pub struct PositionSymbol {
    pub symbol: Option<UniversalSymbol>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
pub struct UniversalSymbol {
    pub symbol: Option<String>,
    pub description: Option<String>,
}

impl Position {
    /// Ticker nested under `symbol.symbol.symbol`.
    pub fn ticker(&self) -> Option<&str> {
        self.symbol
            .as_ref()
            .and_then(|symbol| symbol.symbol.as_ref())
            .and_then(|symbol| symbol.symbol.as_deref())
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Default)]
#[allow(non_snake_case)]
pub struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub majorDimension: Option<String>,

    #[serde(default)]
    pub values: Vec<Row>,
}

#[derive(Deserialize, Debug)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
}
