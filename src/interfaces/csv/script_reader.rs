use crate::domain::payment::PaymentCategory;
use crate::error::{BilsError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    Preset,
    Pay,
    SplitEven,
    SplitCustom,
    QuickSplit,
    DontSplit,
    Open,
    Incoming,
    Remind,
    Resolve,
}

/// One line of a replay script.
///
/// `ref` is a script-local label: `pay` and `incoming` rows define one,
/// later rows use it to point back at that payment or request. `with`
/// holds the people involved: `Alex;Sam` for even splits,
/// `Alex=10.00;Sam=4` for custom splits, a preset index for quick splits,
/// the sender's name for incoming requests.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScriptRow {
    pub action: ScriptAction,
    #[serde(default)]
    pub r#ref: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<PaymentCategory>,
    #[serde(default)]
    pub with: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Reads replay script rows from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting short records so
/// trailing empty columns can be left off.
pub struct ScriptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScriptReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields rows; a malformed row yields an error and reading
    /// continues with the next one.
    pub fn rows(self) -> impl Iterator<Item = Result<ScriptRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BilsError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "action, ref, name, amount, category, with, note\n\
                    pay, p1, Mojo East, 61.70, restaurant, ,\n\
                    split_even, p1, , , , Alex;Sam, dinner";
        let reader = ScriptReader::new(data.as_bytes());
        let rows: Vec<Result<ScriptRow>> = reader.rows().collect();

        assert_eq!(rows.len(), 2);
        let pay = rows[0].as_ref().unwrap();
        assert_eq!(pay.action, ScriptAction::Pay);
        assert_eq!(pay.r#ref.as_deref(), Some("p1"));
        assert_eq!(pay.amount, Some(dec!(61.70)));
        assert_eq!(pay.category, Some(PaymentCategory::Restaurant));
        assert_eq!(pay.with, None);

        let split = rows[1].as_ref().unwrap();
        assert_eq!(split.action, ScriptAction::SplitEven);
        assert_eq!(split.with.as_deref(), Some("Alex;Sam"));
        assert_eq!(split.note.as_deref(), Some("dinner"));
    }

    #[test]
    fn test_reader_short_rows() {
        let data = "action, ref, name, amount, category, with, note, phone\nremind";
        let rows: Vec<Result<ScriptRow>> = ScriptReader::new(data.as_bytes()).rows().collect();
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.action, ScriptAction::Remind);
        assert_eq!(row.r#ref, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "action, ref, name, amount\nrefund, p1, x, 1.0\npay, p2, x, lots";
        let rows: Vec<Result<ScriptRow>> = ScriptReader::new(data.as_bytes()).rows().collect();

        assert!(rows[0].is_err());
        assert!(rows[1].is_err());
    }
}
