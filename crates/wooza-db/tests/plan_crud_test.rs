//! Integration tests for the `plans` table queries.
//!
//! Each test gets an isolated database from `wooza-test-utils` and drops it
//! on completion.

use std::str::FromStr;

use rust_decimal::Decimal;

use wooza_db::filter::{PlanFilter, Predicate, TextColumn};
use wooza_db::models::NewPlan;
use wooza_db::queries::plans;
use wooza_test_utils::{create_test_db, drop_test_db};

fn new_plan(code: &str, plan_type: &str, operator: &str, ddds: &[i32]) -> NewPlan {
    NewPlan {
        plan_code: code.to_owned(),
        minutes: 100,
        internet: "10GB".to_owned(),
        price: Decimal::from_str("29.75").unwrap(),
        plan_type: plan_type.to_owned(),
        operator: operator.to_owned(),
        ddds: ddds.to_vec(),
    }
}

#[tokio::test]
async fn insert_and_get_plan() {
    let (pool, db_name) = create_test_db().await;

    let plan = plans::insert_plan(&pool, &new_plan("OiPro100", "pós", "oi", &[21, 22]))
        .await
        .expect("insert_plan should succeed");

    assert!(plan.id > 0);
    assert_eq!(plan.plan_code, "OiPro100");
    assert_eq!(plan.price, Decimal::from_str("29.75").unwrap());
    assert_eq!(plan.ddds, vec![21, 22]);

    let fetched = plans::get_plan(&pool, plan.id)
        .await
        .expect("get_plan should succeed")
        .expect("plan should exist");
    assert_eq!(fetched, plan);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn get_plan_returns_none_for_missing_id() {
    let (pool, db_name) = create_test_db().await;

    let result = plans::get_plan(&pool, 4242)
        .await
        .expect("get_plan should not error");
    assert!(result.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_plan_rewrites_row() {
    let (pool, db_name) = create_test_db().await;

    let plan = plans::insert_plan(&pool, &new_plan("timpre200", "pré", "tim", &[11]))
        .await
        .unwrap();

    let mut changed = new_plan("timpre300", "pré", "tim", &[11, 12]);
    changed.minutes = 300;
    let updated = plans::update_plan(&pool, plan.id, &changed)
        .await
        .expect("update_plan should succeed")
        .expect("row should exist");

    assert_eq!(updated.id, plan.id);
    assert_eq!(updated.plan_code, "timpre300");
    assert_eq!(updated.minutes, 300);
    assert_eq!(updated.ddds, vec![11, 12]);

    let missing = plans::update_plan(&pool, plan.id + 1000, &changed)
        .await
        .unwrap();
    assert!(missing.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_plan_removes_row() {
    let (pool, db_name) = create_test_db().await;

    let plan = plans::insert_plan(&pool, &new_plan("vivo1", "controle", "vivo", &[31]))
        .await
        .unwrap();

    assert!(plans::delete_plan(&pool, plan.id).await.unwrap());
    assert!(plans::get_plan(&pool, plan.id).await.unwrap().is_none());
    assert!(!plans::delete_plan(&pool, plan.id).await.unwrap());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn plan_code_exists_checks_exact_code() {
    let (pool, db_name) = create_test_db().await;

    assert!(!plans::plan_code_exists(&pool, "OiPro100").await.unwrap());
    plans::insert_plan(&pool, &new_plan("OiPro100", "pós", "oi", &[21]))
        .await
        .unwrap();
    assert!(plans::plan_code_exists(&pool, "OiPro100").await.unwrap());
    assert!(!plans::plan_code_exists(&pool, "oipro100").await.unwrap());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_plans_applies_filter() {
    let (pool, db_name) = create_test_db().await;

    let a = plans::insert_plan(&pool, &new_plan("a", "controle", "tim", &[21, 22]))
        .await
        .unwrap();
    let b = plans::insert_plan(&pool, &new_plan("b", "pré", "tim", &[21]))
        .await
        .unwrap();
    plans::insert_plan(&pool, &new_plan("c", "controle", "oi", &[11]))
        .await
        .unwrap();

    let all = plans::list_plans(&pool, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let by_ddd = PlanFilter::new(vec![
        Predicate::DddsContain(vec![21]),
        Predicate::NotNull(TextColumn::PlanType),
        Predicate::NotNull(TextColumn::Operator),
        Predicate::NotNull(TextColumn::PlanCode),
    ]);
    let ids: Vec<i32> = plans::list_plans(&pool, Some(&by_ddd))
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id]);

    let by_ddd_and_type = PlanFilter::new(vec![
        Predicate::DddsContain(vec![21]),
        Predicate::Equals(TextColumn::PlanType, "controle".to_owned()),
    ]);
    let found = plans::list_plans(&pool, Some(&by_ddd_and_type))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, a.id);

    let superset = PlanFilter::new(vec![Predicate::DddsContain(vec![21, 22])]);
    let found = plans::list_plans(&pool, Some(&superset)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].plan_code, "a");

    pool.close().await;
    drop_test_db(&db_name).await;
}
