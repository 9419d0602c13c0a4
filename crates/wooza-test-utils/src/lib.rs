//! PostgreSQL fixtures for wooza integration tests.
//!
//! Every test binary shares one server; each test creates its own throwaway
//! database on it. Set `WOOZA_TEST_PG_URL` (no database name) to use an
//! existing server, otherwise a `postgres:16-alpine` container is started on
//! first use.

use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use wooza_db::config::DbConfig;
use wooza_db::pool;

/// Environment variable naming an externally managed test server.
pub const TEST_PG_URL_ENV: &str = "WOOZA_TEST_PG_URL";

struct Server {
    base_url: String,
    _container: Option<ContainerAsync<Postgres>>,
}

static SERVER: OnceCell<Server> = OnceCell::const_new();

async fn start_server() -> Server {
    if let Ok(url) = std::env::var(TEST_PG_URL_ENV) {
        return Server {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16-alpine")
        .start()
        .await
        .expect("postgres container should start");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port 5432 should be mapped");

    Server {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server URL without a database name.
pub async fn pg_url() -> &'static str {
    &SERVER.get_or_init(start_server).await.base_url
}

async fn config_for(db_name: &str) -> DbConfig {
    DbConfig::new(format!("{}/{db_name}", pg_url().await))
}

/// Create a fresh, migrated database and return `(pool, db_name)`.
///
/// Pass `db_name` to [`drop_test_db`] once the pool is closed.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("wooza_test_{}", Uuid::new_v4().simple());
    let config = config_for(&db_name).await;

    pool::create_database(&config, &db_name)
        .await
        .unwrap_or_else(|e| panic!("creating {db_name}: {e:#}"));
    let db_pool = pool::create_pool(&config)
        .await
        .unwrap_or_else(|e| panic!("connecting to {db_name}: {e:#}"));
    pool::run_migrations(&db_pool)
        .await
        .expect("migrations should apply to a fresh database");

    (db_pool, db_name)
}

/// Drop a database made by [`create_test_db`]. Failures are ignored.
pub async fn drop_test_db(db_name: &str) {
    let config = config_for(db_name).await;
    let _ = pool::drop_database(&config, db_name).await;
}
