use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{CragError, Result};

// =============================================================================
// Monthly quality
// =============================================================================

/// Twelve monthly quality scores (0-1000), index 0 is January.
///
/// Serialized as `season_1` .. `season_12`, matching the upstream dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MonthlyQuality(pub [u16; 12]);

impl MonthlyQuality {
    /// Quality for a 1-based month (1 = January). Out-of-range months yield `None`.
    pub fn month(&self, month: usize) -> Option<u16> {
        month
            .checked_sub(1)
            .and_then(|idx| self.0.get(idx))
            .copied()
    }
}

impl Serialize for MonthlyQuality {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(12))?;
        for (idx, score) in self.0.iter().enumerate() {
            map.serialize_entry(&season_key(idx + 1), score)?;
        }
        map.end()
    }
}

/// Missing or `null` months read as 0; keys other than `season_1` ..
/// `season_12` are ignored.
impl<'de> Deserialize<'de> for MonthlyQuality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(SeasonVisitor)
    }
}

struct SeasonVisitor;

impl<'de> Visitor<'de> for SeasonVisitor {
    type Value = MonthlyQuality;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("monthly quality scores `season_1` .. `season_12`")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut seasons = [0u16; 12];
        while let Some(key) = map.next_key::<String>()? {
            match season_month(&key) {
                Some(month) => {
                    seasons[month - 1] = map.next_value::<Option<u16>>()?.unwrap_or(0);
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(MonthlyQuality(seasons))
    }
}

fn season_key(month: usize) -> String {
    format!("season_{}", month)
}

fn season_month(key: &str) -> Option<usize> {
    key.strip_prefix("season_")?
        .parse::<usize>()
        .ok()
        .filter(|month| (1..=12).contains(month))
}

// =============================================================================
// Record
// =============================================================================

/// A geotagged climbing area.
///
/// Titles are not unique and there is no identifier; two records with the
/// same title are different areas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Overall popularity, 0-4462 upstream. Below 50 is fairly unknown.
    #[serde(deserialize_with = "whole_number")]
    pub popularity: i64,
    /// Number of routes in the area.
    #[serde(deserialize_with = "whole_number")]
    pub total: i64,
    #[serde(flatten)]
    pub seasons: MonthlyQuality,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        longitude: f64,
        latitude: f64,
        popularity: i64,
        total: i64,
    ) -> Self {
        Self {
            title: title.into(),
            longitude,
            latitude,
            popularity,
            total,
            seasons: MonthlyQuality::default(),
        }
    }

    pub fn with_seasons(mut self, seasons: [u16; 12]) -> Self {
        self.seasons = MonthlyQuality(seasons);
        self
    }

    pub fn has_finite_coordinates(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Build a record from one element of the upstream JSON array.
    ///
    /// `index` is the element's position and is only used for error reporting.
    pub fn from_json(index: usize, value: &Value) -> Result<Self> {
        let record =
            Record::deserialize(value).map_err(|e| CragError::malformed(index, e.to_string()))?;
        if !record.has_finite_coordinates() {
            return Err(CragError::malformed(index, "non-finite coordinates"));
        }
        Ok(record)
    }
}

/// Integer fields also accept whole floats such as `12.0`, which show up in
/// some dumps.
fn whole_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(de::Error::custom(format!("{} is not an integer", number))),
    }
}

/// Parse the upstream dataset: a JSON array of area objects.
pub fn parse_records(payload: &str) -> Result<Vec<Record>> {
    let document: Value = serde_json::from_str(payload)?;
    let items = document.as_array().ok_or_else(|| {
        CragError::Serialization("expected a JSON array of records".to_string())
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| Record::from_json(index, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> Value {
        json!({
            "title": "Smith Rock",
            "lat": 44.3672,
            "lon": -121.1406,
            "popularity": 4100,
            "total": 1900,
            "season_1": 120, "season_2": 200, "season_3": 450, "season_4": 800,
            "season_5": 950, "season_6": 700, "season_7": 300, "season_8": 280,
            "season_9": 760, "season_10": 900, "season_11": 400, "season_12": 150
        })
    }

    #[test]
    fn test_from_json_full_record() {
        let rec = Record::from_json(0, &sample_json()).unwrap();
        assert_eq!(rec.title, "Smith Rock");
        assert_eq!(rec.longitude, -121.1406);
        assert_eq!(rec.latitude, 44.3672);
        assert_eq!(rec.popularity, 4100);
        assert_eq!(rec.total, 1900);
        assert_eq!(rec.seasons.month(1), Some(120));
        assert_eq!(rec.seasons.month(12), Some(150));
        assert_eq!(rec.seasons.month(0), None);
        assert_eq!(rec.seasons.month(13), None);
    }

    #[test]
    fn test_from_json_missing_coordinate_is_malformed() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("lat");
        let err = Record::from_json(7, &value).unwrap_err();
        match err {
            CragError::MalformedRecord { index, reason } => {
                assert_eq!(index, 7);
                assert!(reason.contains("lat"));
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_null_popularity_is_malformed() {
        let mut value = sample_json();
        value["popularity"] = Value::Null;
        let err = Record::from_json(0, &value).unwrap_err();
        assert!(matches!(err, CragError::MalformedRecord { .. }));
    }

    #[test]
    fn test_from_json_string_total_is_malformed() {
        let mut value = sample_json();
        value["total"] = json!("lots");
        let err = Record::from_json(4, &value).unwrap_err();
        assert!(matches!(err, CragError::MalformedRecord { index: 4, .. }));
    }

    #[test]
    fn test_from_json_fractional_total_is_malformed() {
        let mut value = sample_json();
        value["total"] = json!(12.5);
        let err = Record::from_json(0, &value).unwrap_err();
        assert!(err.to_string().contains("12.5"));
    }

    #[test]
    fn test_from_json_missing_title_is_malformed() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("title");
        let err = Record::from_json(3, &value).unwrap_err();
        match err {
            CragError::MalformedRecord { index, reason } => {
                assert_eq!(index, 3);
                assert!(reason.contains("title"));
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_out_of_range_season_is_malformed() {
        let mut value = sample_json();
        value["season_4"] = json!(70000);
        let err = Record::from_json(0, &value).unwrap_err();
        assert!(matches!(err, CragError::MalformedRecord { .. }));
    }

    #[test]
    fn test_from_json_null_season_and_extra_keys() {
        let mut value = sample_json();
        value["season_2"] = Value::Null;
        value["season_13"] = json!(999);
        value["area_id"] = json!("abc");
        let rec = Record::from_json(0, &value).unwrap();
        assert_eq!(rec.seasons.month(2), Some(0));
        assert_eq!(rec.seasons.month(3), Some(450));
    }

    #[test]
    fn test_from_json_whole_float_total_accepted() {
        let mut value = sample_json();
        value["total"] = json!(12.0);
        let rec = Record::from_json(0, &value).unwrap();
        assert_eq!(rec.total, 12);
    }

    #[test]
    fn test_from_json_missing_seasons_default_to_zero() {
        let value = json!({
            "title": "Boulder Field", "lat": 1.0, "lon": 2.0,
            "popularity": 3, "total": 4
        });
        let rec = Record::from_json(0, &value).unwrap();
        assert_eq!(rec.seasons, MonthlyQuality::default());
    }

    #[test]
    fn test_from_json_non_object_is_malformed() {
        let err = Record::from_json(2, &json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CragError::MalformedRecord { index: 2, .. }));
    }

    #[test]
    fn test_parse_records_reports_first_bad_index() {
        let payload = r#"[
            {"title": "A", "lat": 1.0, "lon": 1.0, "popularity": 1, "total": 1},
            {"title": "B", "lon": 1.0, "popularity": 1, "total": 1}
        ]"#;
        let err = parse_records(payload).unwrap_err();
        assert!(matches!(err, CragError::MalformedRecord { index: 1, .. }));
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        let err = parse_records(r#"{"title": "A"}"#).unwrap_err();
        assert!(matches!(err, CragError::Serialization(_)));
    }

    #[test]
    fn test_parse_records_invalid_json() {
        let err = parse_records("not json").unwrap_err();
        assert!(matches!(err, CragError::Serialization(_)));
    }

    #[test]
    fn test_parse_records_empty_array() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_record_serializes_upstream_field_names() {
        let rec = Record::new("Index", -121.5, 47.8, 900, 350).with_seasons([5; 12]);
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["lon"], json!(-121.5));
        assert_eq!(value["lat"], json!(47.8));
        assert_eq!(value["season_1"], json!(5));
        assert_eq!(value["season_12"], json!(5));
        assert!(value.get("seasons").is_none());

        // Serialized output parses back into the same record.
        let back = Record::from_json(0, &value).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_duplicate_titles_are_distinct_records() {
        let a = Record::new("The Wall", 0.0, 0.0, 1, 1);
        let b = Record::new("The Wall", 1.0, 1.0, 1, 1);
        assert_ne!(a, b);
    }
}
