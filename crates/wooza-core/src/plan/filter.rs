//! Translation of list query parameters into a [`PlanFilter`].
//!
//! Filtering only switches on when a `ddds` parameter is present. In that
//! case the filter always carries four predicates, ANDed together:
//! `ddds` containment, then `plan_type`, `operator` and `plan_code`, each an
//! equality when the parameter is given and a non-null pass-through when it
//! is not. Without `ddds` the other parameters are ignored and every plan is
//! listed; existing clients rely on that.

use std::collections::BTreeMap;

use thiserror::Error;

use wooza_db::filter::{PlanFilter, Predicate, TextColumn};

/// Multi-valued query string parameters, in arrival order per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

impl QueryParams {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The first value supplied for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.first()).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in iter {
            map.entry(key.into()).or_default().push(value.into());
        }
        Self(map)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("ddds filter {0:?} is not a list of integers")]
    InvalidDdds(String),
}

/// Build the list filter, or `None` when every plan should be listed.
pub fn build_filter(params: &QueryParams) -> Result<Option<PlanFilter>, FilterError> {
    let Some(raw_ddds) = params.first("ddds") else {
        return Ok(None);
    };
    let ddds = parse_ddds_literal(raw_ddds)?;

    // Stored plan_type and operator are lower-case; plan_code is verbatim.
    let plan_type = text_predicate(params, TextColumn::PlanType, str::to_lowercase);
    let operator = text_predicate(params, TextColumn::Operator, str::to_lowercase);
    let plan_code = text_predicate(params, TextColumn::PlanCode, str::to_owned);

    Ok(Some(PlanFilter::new(vec![
        Predicate::DddsContain(ddds),
        plan_type,
        operator,
        plan_code,
    ])))
}

fn text_predicate(
    params: &QueryParams,
    column: TextColumn,
    normalize: impl Fn(&str) -> String,
) -> Predicate {
    match params.first(column.as_str()) {
        Some(value) => Predicate::Equals(column, normalize(value)),
        None => Predicate::NotNull(column),
    }
}

/// Parse an integer sequence literal: `[21,22]`, `(21, 22)`, `[21,]`, `[]`
/// or a bare `21`.
pub fn parse_ddds_literal(raw: &str) -> Result<Vec<i32>, FilterError> {
    let invalid = || FilterError::InvalidDdds(raw.to_owned());

    let trimmed = raw.trim();
    let (inner, bracketed) = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some('['), Some(']')) | (Some('('), Some(')')) if trimmed.len() >= 2 => {
            (&trimmed[1..trimmed.len() - 1], true)
        }
        _ => (trimmed, false),
    };

    if inner.trim().is_empty() {
        return if bracketed { Ok(Vec::new()) } else { Err(invalid()) };
    }

    let mut items: Vec<&str> = inner.split(',').map(str::trim).collect();
    if items.len() > 1 && items.last().is_some_and(|s| s.is_empty()) {
        items.pop();
    }

    items
        .into_iter()
        .map(|item| item.parse::<i32>().map_err(|_| invalid()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn no_ddds_means_no_filter() {
        assert_eq!(build_filter(&params(&[])).unwrap(), None);
        assert_eq!(
            build_filter(&params(&[("plan_type", "Controle"), ("operator", "Tim")])).unwrap(),
            None
        );
    }

    #[test]
    fn ddds_alone_passes_other_columns_through() {
        let filter = build_filter(&params(&[("ddds", "[21,22]")])).unwrap().unwrap();
        assert_eq!(
            filter.predicates(),
            &[
                Predicate::DddsContain(vec![21, 22]),
                Predicate::NotNull(TextColumn::PlanType),
                Predicate::NotNull(TextColumn::Operator),
                Predicate::NotNull(TextColumn::PlanCode),
            ]
        );
    }

    #[test]
    fn supplied_columns_become_equalities() {
        let filter = build_filter(&params(&[
            ("ddds", "[21]"),
            ("plan_type", "Controle"),
            ("operator", "TIM"),
            ("plan_code", "TimControle50"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(
            filter.predicates(),
            &[
                Predicate::DddsContain(vec![21]),
                Predicate::Equals(TextColumn::PlanType, "controle".to_owned()),
                Predicate::Equals(TextColumn::Operator, "tim".to_owned()),
                Predicate::Equals(TextColumn::PlanCode, "TimControle50".to_owned()),
            ]
        );
    }

    #[test]
    fn first_value_wins() {
        let filter = build_filter(&params(&[
            ("ddds", "[11]"),
            ("ddds", "[21]"),
            ("operator", "oi"),
            ("operator", "vivo"),
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(filter.predicates()[0], Predicate::DddsContain(vec![11]));
        assert_eq!(
            filter.predicates()[2],
            Predicate::Equals(TextColumn::Operator, "oi".to_owned())
        );
    }

    #[test]
    fn literal_forms() {
        assert_eq!(parse_ddds_literal("[21, 22]").unwrap(), vec![21, 22]);
        assert_eq!(parse_ddds_literal("(21,)").unwrap(), vec![21]);
        assert_eq!(parse_ddds_literal("[21,]").unwrap(), vec![21]);
        assert_eq!(parse_ddds_literal(" 21 ").unwrap(), vec![21]);
        assert_eq!(parse_ddds_literal("[]").unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn malformed_literals_are_rejected() {
        for raw in ["", "[", "[21 22]", "[21,,22]", "[,]", "[a]", "21]", "[21.5]"] {
            assert_eq!(
                parse_ddds_literal(raw),
                Err(FilterError::InvalidDdds(raw.to_owned())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_ddds_fails_build() {
        assert!(build_filter(&params(&[("ddds", "twenty-one")])).is_err());
    }
}
