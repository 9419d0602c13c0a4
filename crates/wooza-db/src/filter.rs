//! Filter predicates over the `plans` table.
//!
//! A [`PlanFilter`] is a conjunction of [`Predicate`]s. The same filter is
//! rendered to SQL by [`PlanFilter::push_sql`] and evaluated in memory by
//! [`PlanFilter::matches`], so both store backends agree on semantics.

use sqlx::{Postgres, QueryBuilder};

use crate::models::Plan;

/// Filterable text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    PlanType,
    Operator,
    PlanCode,
}

impl TextColumn {
    /// SQL column name. Always a fixed identifier, never user input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlanType => "plan_type",
            Self::Operator => "operator",
            Self::PlanCode => "plan_code",
        }
    }

    fn value_of(self, plan: &Plan) -> &str {
        match self {
            Self::PlanType => &plan.plan_type,
            Self::Operator => &plan.operator,
            Self::PlanCode => &plan.plan_code,
        }
    }
}

/// A single boolean condition over a stored plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The plan's `ddds` array contains every listed code.
    DddsContain(Vec<i32>),
    /// The column equals the given value exactly.
    Equals(TextColumn, String),
    /// The column is not null. Matches every stored row.
    NotNull(TextColumn),
}

impl Predicate {
    /// Evaluate the predicate against an in-memory plan.
    pub fn matches(&self, plan: &Plan) -> bool {
        match self {
            Self::DddsContain(codes) => codes.iter().all(|code| plan.ddds.contains(code)),
            Self::Equals(column, value) => column.value_of(plan) == value,
            Self::NotNull(_) => true,
        }
    }

    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Self::DddsContain(codes) => {
                qb.push("ddds @> ");
                qb.push_bind(codes.clone());
            }
            Self::Equals(column, value) => {
                qb.push(column.as_str());
                qb.push(" = ");
                qb.push_bind(value.clone());
            }
            Self::NotNull(column) => {
                qb.push(column.as_str());
                qb.push(" IS NOT NULL");
            }
        }
    }
}

/// Conjunction of predicates. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanFilter {
    predicates: Vec<Predicate>,
}

impl PlanFilter {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True when every predicate holds for `plan`.
    pub fn matches(&self, plan: &Plan) -> bool {
        self.predicates.iter().all(|p| p.matches(plan))
    }

    /// Append a `WHERE` clause for this filter to `qb`. Pushes nothing when
    /// the filter has no predicates.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(qb);
        }
    }
}
