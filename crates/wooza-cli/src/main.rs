mod config;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use wooza_core::store::{MemoryPlanStore, PgPlanStore};
use wooza_core::{PlanService, PlanStore};
use wooza_db::config::DbConfig;
use wooza_db::pool;

use config::{CliOverrides, WoozaConfig};

#[derive(Parser)]
#[command(name = "wooza", about = "REST service for telecom plan records")]
struct Cli {
    /// Database URL (overrides WOOZA_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a wooza config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Address the HTTP server binds to
        #[arg(long, default_value = config::DEFAULT_BIND)]
        bind: String,
        /// Port the HTTP server listens on
        #[arg(long, default_value_t = config::DEFAULT_PORT)]
        port: u16,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the wooza database if needed and apply migrations
    DbInit,
    /// Serve the plan REST API
    Serve {
        /// Address to bind (overrides WOOZA_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides WOOZA_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Keep plans in memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
}

/// Execute the `wooza init` command: write config file.
fn cmd_init(db_url: &str, bind: &str, port: u16, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_owned(),
        },
        server: config::ServerSection {
            bind: bind.to_owned(),
            port,
        },
        choices: None,
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  server = {bind}:{port}");
    println!();
    println!("Next: run `wooza db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `wooza db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = WoozaConfig::resolve(CliOverrides {
        database_url: cli_db_url,
        ..CliOverrides::default()
    })?;

    println!("Initializing wooza database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let count = pool::plan_count(&db_pool).await?;
    println!("Database ready. plans: {count} rows");

    db_pool.close().await;

    println!("wooza db-init complete.");
    Ok(())
}

/// Execute the `wooza serve` command.
async fn cmd_serve(overrides: CliOverrides<'_>, in_memory: bool) -> anyhow::Result<()> {
    let resolved = WoozaConfig::resolve(overrides)?;

    let mut db_pool = None;
    let store: Arc<dyn PlanStore> = if in_memory {
        tracing::warn!("serving from the in-memory store; plans are lost on exit");
        Arc::new(MemoryPlanStore::new())
    } else {
        let pg = pool::create_pool(&resolved.db_config).await?;
        pool::run_migrations(&pg).await?;
        db_pool = Some(pg.clone());
        Arc::new(PgPlanStore::new(pg))
    };

    let service = PlanService::new(store, Arc::new(resolved.choices));
    let result = serve_cmd::run_serve(service, &resolved.bind, resolved.port).await;

    if let Some(db_pool) = db_pool {
        db_pool.close().await;
    }
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            bind,
            port,
            force,
        } => {
            cmd_init(&db_url, &bind, port, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve {
            bind,
            port,
            in_memory,
        } => {
            let overrides = CliOverrides {
                database_url: cli.database_url.as_deref(),
                bind: bind.as_deref(),
                port,
            };
            cmd_serve(overrides, in_memory).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "wooza",
            "--database-url",
            "postgresql://h:5432/db",
            "serve",
            "--port",
            "9001",
            "--in-memory",
        ])
        .unwrap();
        assert_eq!(cli.database_url.as_deref(), Some("postgresql://h:5432/db"));
        match cli.command {
            Commands::Serve {
                bind,
                port,
                in_memory,
            } => {
                assert!(bind.is_none());
                assert_eq!(port, Some(9001));
                assert!(in_memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn init_defaults() {
        let cli = Cli::try_parse_from(["wooza", "init"]).unwrap();
        match cli.command {
            Commands::Init {
                db_url,
                bind,
                port,
                force,
            } => {
                assert_eq!(db_url, DbConfig::DEFAULT_URL);
                assert_eq!(bind, "127.0.0.1");
                assert_eq!(port, 8000);
                assert!(!force);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let _lock = test_util::lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let previous = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        cmd_init("postgresql://a:5432/a", "127.0.0.1", 8000, false).unwrap();
        let err = cmd_init("postgresql://b:5432/b", "127.0.0.1", 8000, false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        cmd_init("postgresql://b:5432/b", "0.0.0.0", 8080, true).unwrap();
        let loaded = config::load_config().unwrap().unwrap();
        assert_eq!(loaded.database.url, "postgresql://b:5432/b");
        assert_eq!(loaded.server.port, 8080);

        unsafe {
            match previous {
                Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }
}
