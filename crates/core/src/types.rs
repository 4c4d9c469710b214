use serde::{Deserialize, Serialize};

/// Sentinel rendered for observations the service has no value for.
pub const MISSING_VALUE: &str = "n.d.";

/// One row of the metadata catalog. Other catalog columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub code: String,
    pub name: String,
    pub group: String,
}

/// Code and name of a series, as listed by series-by-group search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub code: String,
    pub name: String,
}

impl From<&MetadataRow> for SeriesSummary {
    fn from(row: &MetadataRow) -> Self {
        Self {
            code: row.code.clone(),
            name: row.name.clone(),
        }
    }
}

/// A dated observation. Serializes as `[date, value]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct SeriesObservation {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Upstream value, or [`MISSING_VALUE`].
    pub value: String,
}

impl SeriesObservation {
    /// Build an observation, collapsing any form of "no value" to [`MISSING_VALUE`].
    pub fn new(date: impl Into<String>, value: Option<&str>) -> Self {
        let value = match value.map(str::trim) {
            Some(v) if !is_missing(v) => v.to_string(),
            _ => MISSING_VALUE.to_string(),
        };
        Self {
            date: date.into(),
            value,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.value == MISSING_VALUE
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case(MISSING_VALUE)
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("null")
}

impl From<(String, String)> for SeriesObservation {
    fn from((date, value): (String, String)) -> Self {
        Self { date, value }
    }
}

impl From<SeriesObservation> for (String, String) {
    fn from(obs: SeriesObservation) -> Self {
        (obs.date, obs.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_render_as_nd() {
        for raw in [None, Some(""), Some("  "), Some("n.d."), Some("N.D."), Some("NaN"), Some("null")] {
            let obs = SeriesObservation::new("2020-01-01", raw);
            assert_eq!(obs.value, "n.d.", "{:?}", raw);
            assert!(obs.is_missing());
        }
    }

    #[test]
    fn test_present_value_is_trimmed() {
        let obs = SeriesObservation::new("2020-01-01", Some(" 3.3597 "));
        assert_eq!(obs.value, "3.3597");
        assert!(!obs.is_missing());
    }

    #[test]
    fn test_observation_serializes_as_pair() {
        let obs = SeriesObservation::new("2020-01-01", Some("1.5"));
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json, serde_json::json!(["2020-01-01", "1.5"]));
    }
}
