use crate::error::SyncError;
use schema::Position;
use schema::Row;
use serde_json::Value;

/// A position flattened into the three spreadsheet columns.
#[derive(Debug, PartialEq, Clone)]
pub struct PositionRow {
    pub ticker: String,
    pub units: f64,
    pub market_value: f64,
}

impl From<PositionRow> for Row {
    fn from(row: PositionRow) -> Self {
        vec![
            Value::from(row.ticker),
            Value::from(row.units),
            Value::from(row.market_value),
        ]
    }
}

#[derive(Default)]
pub struct PositionRenderer;

impl PositionRenderer {
    /// Keeps the upstream order; fails on the first position lacking a field.
    pub fn render(&self, positions: &[Position]) -> Result<Vec<PositionRow>, SyncError> {
        positions
            .iter()
            .enumerate()
            .map(|(index, position)| render_entry(index, position))
            .collect()
    }
}

fn render_entry(index: usize, position: &Position) -> Result<PositionRow, SyncError> {
    let malformed = |field| SyncError::MalformedPosition { index, field };
    let ticker = position.ticker().ok_or_else(|| malformed("symbol"))?;
    let units = position.units.ok_or_else(|| malformed("units"))?;
    let price = position.price.ok_or_else(|| malformed("price"))?;
    Ok(PositionRow {
        ticker: ticker.to_string(),
        units,
        market_value: units * price,
    })
}

#[cfg(test)]
pub(crate) fn build_position(ticker: &str, units: f64, price: f64) -> Position {
    use schema::PositionSymbol;
    use schema::UniversalSymbol;

    Position {
        symbol: Some(PositionSymbol {
            symbol: Some(UniversalSymbol {
                symbol: Some(ticker.into()),
                description: None,
            }),
        }),
        units: Some(units),
        price: Some(price),
    }
}
