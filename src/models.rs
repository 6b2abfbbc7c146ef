use serde::{Deserialize, Serialize};

/// Attributes of the two fighters in a single bout.
///
/// Ages are in years and reaches are unitless integers. Either may be `None`
/// when unknown. Integer fields also accept whole floats (`80.0`) and numeric
/// strings (`"80"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutFeatures {
    pub fighter_a: String,
    pub fighter_b: String,
    #[serde(default, deserialize_with = "lax_int::deserialize")]
    pub age_a: Option<i64>,
    #[serde(default, deserialize_with = "lax_int::deserialize")]
    pub age_b: Option<i64>,
    #[serde(default, deserialize_with = "lax_int::deserialize")]
    pub reach_a: Option<i64>,
    #[serde(default, deserialize_with = "lax_int::deserialize")]
    pub reach_b: Option<i64>,
}

#[cfg(test)]
impl BoutFeatures {
    /// A bout with only the fighter labels filled in.
    pub fn new(fighter_a: impl Into<String>, fighter_b: impl Into<String>) -> Self {
        Self {
            fighter_a: fighter_a.into(),
            fighter_b: fighter_b.into(),
            age_a: None,
            age_b: None,
            reach_a: None,
            reach_b: None,
        }
    }

    pub fn with_ages(mut self, age_a: i64, age_b: i64) -> Self {
        self.age_a = Some(age_a);
        self.age_b = Some(age_b);
        self
    }

    pub fn with_reaches(mut self, reach_a: i64, reach_b: i64) -> Self {
        self.reach_a = Some(reach_a);
        self.reach_b = Some(reach_b);
        self
    }
}

/// Parse an integer from text: `"80"`, `" 80 "` and `"80.0"` all give 80.
/// Fractional, non-finite or out-of-range values give `None`.
pub fn parse_lax_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(whole_float))
}

fn whole_float(f: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&f);
    (in_range && f.fract() == 0.0).then(|| f as i64)
}

/// `Option<i64>` that accepts null, integers, whole floats and numeric strings.
mod lax_int {
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LaxIntVisitor)
    }

    struct LaxIntVisitor;

    impl<'de> Visitor<'de> for LaxIntVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or null")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            super::whole_float(v)
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Float(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            super::parse_lax_int(v)
                .map(Some)
                .ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}

/// Win-probability estimate returned by `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub fighter_a: String,
    pub fighter_b: String,
    /// Probability that fighter A wins, rounded to 3 decimal places
    pub prob_a: f64,
    /// Probability that fighter B wins, rounded to 3 decimal places
    pub prob_b: f64,
    /// Identifier of the heuristic that produced the numbers
    pub model: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// One entry of a validation error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable kind, e.g. "json_invalid" or "missing"
    #[serde(rename = "type")]
    pub kind: String,
    /// Where the problem is, e.g. `["body", "fighter_b"]`
    pub loc: Vec<String>,
    pub msg: String,
}

/// Body returned with `422 Unprocessable Entity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub detail: Vec<ValidationIssue>,
}
