use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row in the `plans` table.
///
/// Field order matches the record shape returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: i32,
    pub plan_code: String,
    pub minutes: i32,
    pub internet: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub plan_type: String,
    pub operator: String,
    pub ddds: Vec<i32>,
}

/// Column values for a plan that has not been assigned an id.
///
/// Used both for inserts and for full-row rewrites on update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlan {
    pub plan_code: String,
    pub minutes: i32,
    pub internet: String,
    pub price: Decimal,
    pub plan_type: String,
    pub operator: String,
    pub ddds: Vec<i32>,
}

impl Plan {
    /// Attach a store-assigned id to a set of column values.
    pub fn from_new(id: i32, new: NewPlan) -> Self {
        Self {
            id,
            plan_code: new.plan_code,
            minutes: new.minutes,
            internet: new.internet,
            price: new.price,
            plan_type: new.plan_type,
            operator: new.operator,
            ddds: new.ddds,
        }
    }
}

impl From<Plan> for NewPlan {
    fn from(plan: Plan) -> Self {
        Self {
            plan_code: plan.plan_code,
            minutes: plan.minutes,
            internet: plan.internet,
            price: plan.price,
            plan_type: plan.plan_type,
            operator: plan.operator,
            ddds: plan.ddds,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn serializes_price_as_number() {
        let plan = Plan {
            id: 7,
            plan_code: "OiPro100".to_owned(),
            minutes: 100,
            internet: "10GB".to_owned(),
            price: Decimal::from_str("29.75").unwrap(),
            plan_type: "pós".to_owned(),
            operator: "oi".to_owned(),
            ddds: vec![21, 22],
        };

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "plan_code": "OiPro100",
                "minutes": 100,
                "internet": "10GB",
                "price": 29.75,
                "plan_type": "pós",
                "operator": "oi",
                "ddds": [21, 22]
            })
        );
    }

    #[test]
    fn new_plan_round_trips_through_from_new() {
        let new = NewPlan {
            plan_code: "timpre200".to_owned(),
            minutes: 200,
            internet: "20GB".to_owned(),
            price: Decimal::from_str("99.90").unwrap(),
            plan_type: "pré".to_owned(),
            operator: "tim".to_owned(),
            ddds: vec![11],
        };
        let plan = Plan::from_new(3, new.clone());
        assert_eq!(plan.id, 3);
        assert_eq!(NewPlan::from(plan), new);
    }
}
