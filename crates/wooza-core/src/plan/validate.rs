//! Plan payload validation.
//!
//! Rules, applied per field in reporting order:
//! - a present field holding an empty value (`null`, `""`, `0`, `[]`, `{}`,
//!   `false`) is reported as `"is empty"` and not checked further;
//! - `minutes` must parse as an integer (JSON numbers with no fractional
//!   part included), `price` as a finite number that still fits
//!   `NUMERIC(8, 2)` once rounded to cents;
//! - `plan_type` must be one of the configured plan types;
//! - every `ddds` entry must be one of the configured area codes, with one
//!   error per offending entry.
//!
//! On create every field is required. On update only the supplied fields are
//! checked.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use wooza_db::models::NewPlan;

use super::payload::{
    DDDS, INTERNET, MINUTES, OPERATOR, PLAN_CODE, PLAN_TYPE, PRICE, PlanChanges, PlanPayload,
};
use crate::choices::Choices;

pub const IS_EMPTY: &str = "is empty";
pub const IS_REQUIRED: &str = "is required.";
pub const NOT_A_NUMBER: &str = "is not a valid number.";
pub const NOT_A_CHOICE: &str = "is not a valid choice.";
pub const NOT_TEXT: &str = "is not a valid text.";
pub const TOO_LONG: &str = "is too long.";
pub const ALREADY_EXISTS: &str = "already exists.";

/// Column widths from the `plans` migration.
const MAX_PLAN_CODE_LEN: usize = 50;
const MAX_INTERNET_LEN: usize = 50;
const MAX_PLAN_TYPE_LEN: usize = 16;
const MAX_OPERATOR_LEN: usize = 32;

/// Largest magnitude a `NUMERIC(8, 2)` price can hold, in cents.
const MAX_PRICE_CENTS: i64 = 99_999_999;

/// One field-level validation failure. Serializes as `{"<field>": "<reason>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: &'static str,
}

impl InvalidField {
    pub const fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

impl Serialize for InvalidField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field, self.reason)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// Validate a create payload. Returns an empty list when it is acceptable.
pub fn validate(payload: &PlanPayload, choices: &Choices) -> Vec<InvalidField> {
    check(payload, choices, Mode::Create).1
}

/// Validate a partial update payload: omitted fields are neither required
/// nor checked.
pub fn validate_for_update(payload: &PlanPayload, choices: &Choices) -> Vec<InvalidField> {
    check(payload, choices, Mode::Update).1
}

/// Validate a create payload and convert it into column values.
pub fn parse_new_plan(payload: &PlanPayload, choices: &Choices) -> Result<NewPlan, Vec<InvalidField>> {
    let (changes, errors) = check(payload, choices, Mode::Create);
    if !errors.is_empty() {
        return Err(errors);
    }
    // Create mode reports every missing field, so this only fails if a
    // checker forgot to record an error.
    changes.into_new_plan().ok_or_else(|| {
        payload
            .fields()
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| InvalidField::new(field, IS_REQUIRED))
            .collect()
    })
}

/// Validate an update payload and convert the supplied fields.
pub fn parse_changes(payload: &PlanPayload, choices: &Choices) -> Result<PlanChanges, Vec<InvalidField>> {
    let (changes, errors) = check(payload, choices, Mode::Update);
    if errors.is_empty() { Ok(changes) } else { Err(errors) }
}

fn check(payload: &PlanPayload, choices: &Choices, mode: Mode) -> (PlanChanges, Vec<InvalidField>) {
    let mut checker = Checker {
        mode,
        errors: Vec::new(),
    };

    let changes = PlanChanges {
        plan_code: checker
            .present(PLAN_CODE, payload.plan_code.as_ref())
            .and_then(|v| checker.text(PLAN_CODE, v, MAX_PLAN_CODE_LEN)),
        minutes: checker
            .present(MINUTES, payload.minutes.as_ref())
            .and_then(|v| checker.minutes(v)),
        internet: checker
            .present(INTERNET, payload.internet.as_ref())
            .and_then(|v| checker.text(INTERNET, v, MAX_INTERNET_LEN)),
        price: checker
            .present(PRICE, payload.price.as_ref())
            .and_then(|v| checker.price(v)),
        plan_type: checker
            .present(PLAN_TYPE, payload.plan_type.as_ref())
            .and_then(|v| checker.plan_type(v, choices)),
        operator: checker
            .present(OPERATOR, payload.operator.as_ref())
            .and_then(|v| checker.text(OPERATOR, v, MAX_OPERATOR_LEN))
            .map(|op| op.to_lowercase()),
        ddds: checker
            .present(DDDS, payload.ddds.as_ref())
            .and_then(|v| checker.ddds(v, choices)),
    };

    (changes, checker.errors)
}

/// Python-style truthiness: these values count as "empty".
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

struct Checker {
    mode: Mode,
    errors: Vec<InvalidField>,
}

impl Checker {
    fn reject(&mut self, field: &'static str, reason: &'static str) {
        self.errors.push(InvalidField::new(field, reason));
    }

    /// The value if it should be checked further.
    fn present<'v>(&mut self, field: &'static str, value: Option<&'v Value>) -> Option<&'v Value> {
        match value {
            None => {
                if self.mode == Mode::Create {
                    self.reject(field, IS_REQUIRED);
                }
                None
            }
            Some(v) if is_empty(v) => {
                self.reject(field, IS_EMPTY);
                None
            }
            Some(v) => Some(v),
        }
    }

    /// Free-form text. Numbers are accepted and kept in their JSON spelling.
    fn text(&mut self, field: &'static str, value: &Value, max_len: usize) -> Option<String> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.reject(field, NOT_TEXT);
                return None;
            }
        };
        if text.chars().count() > max_len {
            self.reject(field, TOO_LONG);
            return None;
        }
        Some(text)
    }

    fn minutes(&mut self, value: &Value) -> Option<i32> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| whole_number(n.as_f64()?)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .and_then(|i| i32::try_from(i).ok());
        if parsed.is_none() {
            self.reject(MINUTES, NOT_A_NUMBER);
        }
        parsed
    }

    fn price(&mut self, value: &Value) -> Option<Decimal> {
        let parsed = match value {
            Value::Number(n) => n.as_f64().and_then(|f| to_price(f, None)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<f64>().ok().and_then(|f| to_price(f, Some(s)))
            }
            _ => None,
        };
        if parsed.is_none() {
            self.reject(PRICE, NOT_A_NUMBER);
        }
        parsed
    }

    fn plan_type(&mut self, value: &Value, choices: &Choices) -> Option<String> {
        match value {
            Value::String(s) if choices.is_plan_type(s) => {
                let normalized = s.to_lowercase();
                if normalized.chars().count() > MAX_PLAN_TYPE_LEN {
                    self.reject(PLAN_TYPE, TOO_LONG);
                    return None;
                }
                Some(normalized)
            }
            _ => {
                self.reject(PLAN_TYPE, NOT_A_CHOICE);
                None
            }
        }
    }

    fn ddds(&mut self, value: &Value, choices: &Choices) -> Option<Vec<i32>> {
        let Value::Array(items) = value else {
            self.reject(DDDS, NOT_A_CHOICE);
            return None;
        };

        let mut codes = Vec::with_capacity(items.len());
        let mut valid = true;
        for item in items {
            match item.as_i64().filter(|code| choices.is_ddd(*code)) {
                // is_ddd guarantees the code fits in an i32.
                Some(code) => codes.push(code as i32),
                None => {
                    self.reject(DDDS, NOT_A_CHOICE);
                    valid = false;
                }
            }
        }
        valid.then_some(codes)
    }
}

/// `100.0` counts as the integer 100.
fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64)
        .then_some(value as i64)
}

/// Convert a parsed price to a two-place decimal, rounding half away from
/// zero as PostgreSQL does. `exact` is the submitted text, preferred over the
/// float to avoid binary rounding noise.
fn to_price(value: f64, exact: Option<&str>) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    let decimal = exact
        .and_then(|s| Decimal::from_str(s).ok())
        .or_else(|| Decimal::from_f64(value))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    (decimal.abs() <= Decimal::new(MAX_PRICE_CENTS, 2)).then_some(decimal)
}
