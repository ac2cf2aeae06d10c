/// Serde adapter for the catalog's `YYYY-MM-DD` release dates.
///
/// The API sends `""` for unknown dates; that, `null`, a missing field and
/// anything unparseable all read as `None`.
pub mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| NaiveDate::parse_from_str(s, FORMAT).ok()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Dated {
        #[serde(default, with = "super::lenient_date")]
        release_date: Option<NaiveDate>,
    }

    #[test]
    fn test_empty_and_missing_dates_are_none() {
        let empty: Dated = serde_json::from_str(r#"{"release_date": ""}"#).unwrap();
        assert_eq!(empty.release_date, None);

        let null: Dated = serde_json::from_str(r#"{"release_date": null}"#).unwrap();
        assert_eq!(null.release_date, None);

        let missing: Dated = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.release_date, None);

        let garbage: Dated = serde_json::from_str(r#"{"release_date": "soon"}"#).unwrap();
        assert_eq!(garbage.release_date, None);
    }

    #[test]
    fn test_valid_date_survives_serialization() {
        let dated: Dated = serde_json::from_str(r#"{"release_date": "2020-01-01"}"#).unwrap();
        assert_eq!(dated.release_date, NaiveDate::from_ymd_opt(2020, 1, 1));

        let json = serde_json::to_string(&dated).unwrap();
        assert_eq!(json, r#"{"release_date":"2020-01-01"}"#);
    }
}
