//! Request DTOs for the cache gateway API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::store::MAX_TTL_MS;

/// Request body for creating an entry (POST /api/cache)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    /// The cache key
    #[serde(default)]
    pub key: String,
    /// The value to store, any JSON document
    #[serde(default)]
    pub value: Value,
}

impl CreateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.trim().is_empty() {
            return Some("Key cannot be blank".to_string());
        }
        if self.value.is_null() {
            return Some("Value is required".to_string());
        }
        None
    }
}

/// Request body for updating an entry (PUT /api/cache/{key})
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    /// The new value; `null` counts as missing
    #[serde(default)]
    pub value: Option<Value>,
}

fn default_ttl() -> u64 {
    300
}

fn default_unit() -> String {
    "SECONDS".to_string()
}

/// Query string for creating an entry with expiry (POST /api/cache/ttl)
#[derive(Debug, Clone, Deserialize)]
pub struct TtlParams {
    /// The cache key
    #[serde(default)]
    pub key: String,
    /// The value to store
    #[serde(default)]
    pub value: String,
    /// Time to live, in `unit`s (default 300)
    #[serde(default = "default_ttl")]
    pub ttl: u64,
    /// Unit of `ttl` (default SECONDS)
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl TtlParams {
    /// Validates the parameters and returns the expiry as a Duration.
    pub fn validate(&self) -> Result<Duration, String> {
        if self.key.trim().is_empty() {
            return Err("Key cannot be blank".to_string());
        }
        if self.ttl == 0 {
            return Err("TTL must be greater than zero".to_string());
        }
        let unit: TimeUnit = self.unit.parse()?;
        let ttl = unit.duration(self.ttl);
        if ttl < Duration::from_millis(1) {
            return Err("TTL must be at least one millisecond".to_string());
        }
        if ttl.as_millis() > u128::from(MAX_TTL_MS) {
            return Err(format!("TTL must not exceed {} milliseconds", MAX_TTL_MS));
        }
        Ok(ttl)
    }
}

/// Units accepted for a TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// `amount` of this unit as a Duration (saturating).
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(amount),
            TimeUnit::Microseconds => Duration::from_micros(amount),
            TimeUnit::Milliseconds => Duration::from_millis(amount),
            TimeUnit::Seconds => Duration::from_secs(amount),
            TimeUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(amount.saturating_mul(3_600)),
            TimeUnit::Days => Duration::from_secs(amount.saturating_mul(86_400)),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NANOSECONDS" => Ok(TimeUnit::Nanoseconds),
            "MICROSECONDS" => Ok(TimeUnit::Microseconds),
            "MILLISECONDS" => Ok(TimeUnit::Milliseconds),
            "SECONDS" => Ok(TimeUnit::Seconds),
            "MINUTES" => Ok(TimeUnit::Minutes),
            "HOURS" => Ok(TimeUnit::Hours),
            "DAYS" => Ok(TimeUnit::Days),
            other => Err(format!("Unknown time unit: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_deserialize() {
        let json = r#"{"key": "test", "value": {"n": 1}}"#;
        let req: CreateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, json!({"n": 1}));
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_create_request_missing_fields() {
        let req: CreateRequest = serde_json::from_str(r#"{"value": 1}"#).unwrap();
        assert!(req.validate().unwrap().contains("Key"));

        let req: CreateRequest = serde_json::from_str(r#"{"key": "k"}"#).unwrap();
        assert!(req.validate().unwrap().contains("Value"));
    }

    #[test]
    fn test_update_request_null_is_missing() {
        let req: UpdateRequest = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert!(req.value.is_none());

        let req: UpdateRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.value.is_none());

        let req: UpdateRequest = serde_json::from_str(r#"{"value": false}"#).unwrap();
        assert_eq!(req.value, Some(json!(false)));
    }

    #[test]
    fn test_ttl_params_defaults() {
        let params: TtlParams = serde_json::from_str(r#"{"key": "s", "value": "v"}"#).unwrap();
        assert_eq!(params.ttl, 300);
        assert_eq!(params.unit, "SECONDS");
        assert_eq!(params.validate(), Ok(Duration::from_secs(300)));
    }

    #[test]
    fn test_ttl_params_validation() {
        let mut params = TtlParams {
            key: "s".to_string(),
            value: "v".to_string(),
            ttl: 2,
            unit: "minutes".to_string(),
        };
        assert_eq!(params.validate(), Ok(Duration::from_secs(120)));

        params.unit = "fortnights".to_string();
        assert!(params.validate().is_err());

        params.unit = "SECONDS".to_string();
        params.ttl = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_ttl_params_upper_limit() {
        let mut params = TtlParams {
            key: "s".to_string(),
            value: "v".to_string(),
            ttl: 10_000_000_000_000_000,
            unit: "SECONDS".to_string(),
        };
        assert!(params.validate().unwrap_err().contains("must not exceed"));

        params.unit = "MILLISECONDS".to_string();
        params.ttl = MAX_TTL_MS;
        assert_eq!(params.validate(), Ok(Duration::from_millis(MAX_TTL_MS)));

        params.ttl = MAX_TTL_MS + 1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_time_unit_parse() {
        assert!("ms".parse::<TimeUnit>().is_err());
        assert_eq!("Milliseconds".parse::<TimeUnit>(), Ok(TimeUnit::Milliseconds));
        assert_eq!(TimeUnit::Days.duration(1), Duration::from_secs(86_400));
    }
}
