// Spreadsheet rows come back loosely typed: numeric-looking cells (ids, phones)
// arrive as JSON numbers, dates as full ISO timestamps, empty cells as null.
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serializer};
use serde_json::Value;

pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = string_or_number(deserializer)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

/// Accepts `YYYY-MM-DD` or anything that starts with it (`2025-03-01T00:00:00.000Z`).
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

pub mod date {
    use super::*;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = string_or_number(deserializer)?;
        parse_date_prefix(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }
}

pub fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("number out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid number: {s}"))),
        Value::Null => Ok(0.0),
        other => Err(de::Error::custom(format!("expected number, got {other}"))),
    }
}

pub fn opt_number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number: {s}"))),
        other => Err(de::Error::custom(format!("expected number, got {other}"))),
    }
}

pub fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = number_or_string(deserializer)?;
    Ok(n.round() as i64)
}

pub fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => Ok(matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "x" | "yes")),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        _ => Ok(false),
    }
}

pub fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_prefix_accepts_iso_timestamps() {
        assert_eq!(
            parse_date_prefix("2025-03-01T17:00:00.000Z"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(parse_date_prefix("2025-03-01"), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(parse_date_prefix("03/01/2025"), None);
        assert_eq!(parse_date_prefix("2025"), None);
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        phone: Option<String>,
        #[serde(deserialize_with = "number_or_string")]
        amount: f64,
    }

    #[test]
    fn numeric_cells_become_strings() {
        let row: Row = serde_json::from_str(r#"{"id": 1717171717171, "phone": 909123456, "amount": "12000"}"#).unwrap();
        assert_eq!(row.id, "1717171717171");
        assert_eq!(row.phone.as_deref(), Some("909123456"));
        assert_eq!(row.amount, 12000.0);

        let row: Row = serde_json::from_str(r#"{"id": "abc", "phone": null, "amount": null}"#).unwrap();
        assert_eq!(row.phone, None);
        assert_eq!(row.amount, 0.0);
    }
}
