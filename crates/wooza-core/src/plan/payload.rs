//! Incoming plan payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use wooza_db::models::NewPlan;

/// Field names, in the order they are validated and reported.
pub const PLAN_CODE: &str = "plan_code";
pub const MINUTES: &str = "minutes";
pub const INTERNET: &str = "internet";
pub const PRICE: &str = "price";
pub const PLAN_TYPE: &str = "plan_type";
pub const OPERATOR: &str = "operator";
pub const DDDS: &str = "ddds";

/// Request body for create and update.
///
/// Every field is independently omittable. Values are kept as raw JSON so
/// the validator can report `"100a"` as an invalid number rather than failing
/// the whole body. An explicit `null` counts as present (and empty).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlanPayload {
    #[serde(default, deserialize_with = "present")]
    pub plan_code: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub minutes: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub internet: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub plan_type: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub operator: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub ddds: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Why a request body could not be read as a plan payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,
}

impl PlanPayload {
    /// Decode a request body. The body must be a JSON object; unknown keys
    /// are ignored.
    pub fn from_json(body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(PayloadError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// `(name, value)` for each field, in reporting order.
    pub fn fields(&self) -> [(&'static str, Option<&Value>); 7] {
        [
            (PLAN_CODE, self.plan_code.as_ref()),
            (MINUTES, self.minutes.as_ref()),
            (INTERNET, self.internet.as_ref()),
            (PRICE, self.price.as_ref()),
            (PLAN_TYPE, self.plan_type.as_ref()),
            (OPERATOR, self.operator.as_ref()),
            (DDDS, self.ddds.as_ref()),
        ]
    }
}

/// Typed, validated field values. `None` means "not supplied".
///
/// `plan_type` and `operator` are already lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanChanges {
    pub plan_code: Option<String>,
    pub minutes: Option<i32>,
    pub internet: Option<String>,
    pub price: Option<Decimal>,
    pub plan_type: Option<String>,
    pub operator: Option<String>,
    pub ddds: Option<Vec<i32>>,
}

impl PlanChanges {
    /// Overlay the supplied fields onto `base`.
    pub fn apply_to(self, base: NewPlan) -> NewPlan {
        NewPlan {
            plan_code: self.plan_code.unwrap_or(base.plan_code),
            minutes: self.minutes.unwrap_or(base.minutes),
            internet: self.internet.unwrap_or(base.internet),
            price: self.price.unwrap_or(base.price),
            plan_type: self.plan_type.unwrap_or(base.plan_type),
            operator: self.operator.unwrap_or(base.operator),
            ddds: self.ddds.unwrap_or(base.ddds),
        }
    }

    /// A complete record, or `None` if any field is missing.
    pub fn into_new_plan(self) -> Option<NewPlan> {
        Some(NewPlan {
            plan_code: self.plan_code?,
            minutes: self.minutes?,
            internet: self.internet?,
            price: self.price?,
            plan_type: self.plan_type?,
            operator: self.operator?,
            ddds: self.ddds?,
        })
    }
}
