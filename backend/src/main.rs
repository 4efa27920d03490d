//! Backend entry-point: wires configuration, persistence, and the REST API.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::web;
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::DieselUserRepository;
use backend::outbound::persistence::pool::{DbPool, PoolConfig, spawn_keepalive};
use backend::outbound::sms::{VonageConfig, VonageSmsGateway};
use backend::outbound::token::JwtTokenService;
use backend::server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
const DEFAULT_TOKEN_TTL_DAYS: i64 = 365;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let secret = load_jwt_secret()?;
    let ttl_days = env::var("TOKEN_TTL_DAYS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_DAYS);
    let tokens = JwtTokenService::new(&secret, ttl_days);

    run_migrations(&database_url)?;

    let pool_config = PoolConfig::new(&database_url);
    let keepalive_interval = pool_config.keepalive_interval();
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
    pool.health_check()
        .await
        .map_err(|e| std::io::Error::other(format!("database health check: {e}")))?;
    spawn_keepalive(pool.clone(), keepalive_interval);

    bootstrap_admin(&pool).await?;

    let mut config = ServerConfig::new(bind_addr, pool, tokens);
    if let Some(gateway) = vonage_from_env() {
        config = config.with_sms_gateway(Arc::new(gateway));
    } else {
        warn!("vonage credentials not set; sms sending is disabled");
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting http server");
    let server = create_server(health_state, config)?;
    server.await
}

/// Read the token-signing secret, falling back to an ephemeral one in
/// debug builds so local runs work without provisioning.
fn load_jwt_secret() -> std::io::Result<Vec<u8>> {
    let path = env::var("JWT_SECRET_FILE").unwrap_or_else(|_| "/var/run/secrets/jwt_secret".into());
    match std::fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %path, error = %e, "using ephemeral jwt secret (dev only)");
                Ok(uuid::Uuid::new_v4().into_bytes().to_vec())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read jwt secret at {path}: {e}"
                )))
            }
        }
    }
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("database connection: {e}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("migrations: {e}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

async fn bootstrap_admin(pool: &DbPool) -> std::io::Result<()> {
    match env::var("ADMIN_BOOTSTRAP_PASSWORD") {
        Ok(password) => DieselUserRepository::new(pool.clone())
            .ensure_default_admin(&password)
            .await
            .map_err(|e| std::io::Error::other(format!("admin bootstrap: {e}"))),
        Err(_) => {
            warn!("ADMIN_BOOTSTRAP_PASSWORD not set; skipping default admin bootstrap");
            Ok(())
        }
    }
}

fn vonage_from_env() -> Option<VonageSmsGateway> {
    let api_key = env::var("VONAGE_API_KEY").ok()?;
    let api_secret = env::var("VONAGE_API_SECRET").ok()?;
    let sender_id = env::var("SMS_SENDER_ID").unwrap_or_else(|_| "Workshop".into());
    Some(VonageSmsGateway::new(VonageConfig {
        api_key,
        api_secret,
        sender_id,
    }))
}
