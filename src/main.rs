#![warn(
    clippy::correctness,
    clippy::style,
    clippy::perf,
    clippy::complexity,
    clippy::cognitive_complexity,
    clippy::double_parens,
    clippy::len_zero,
    clippy::question_mark,
    clippy::suspicious,
    clippy::todo
)]

mod api;
mod manager;
pub mod models;
mod play;
pub mod schema;
mod util;

use std::{io::stdout, sync::Arc};

use anyhow::Context;
use axum::Router;
use clap::Parser;
use diesel::pg::Pg;
use diesel_async::{
    async_connection_wrapper::AsyncConnectionWrapper,
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use fred::{clients::Pool as RedisPool, prelude::*, types::config::Config as RedisConfig};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::writer::MakeWriterExt, layer::SubscriberExt, util::SubscriberInitExt,
};
use utoipa_scalar::{Scalar, Servable};

use crate::util::jwt::Keys;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Deserialize, Clone)]
struct Config {
    main: Main,
    auth: Auth,
}

#[derive(Deserialize, Clone)]
struct Main {
    address: String,
    database: String,
    redis: String,
}

#[derive(Deserialize, Clone)]
struct Auth {
    jwt_secret: String,
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    db: Pool<diesel_async::AsyncPgConnection>,
    redis: Arc<RedisPool>,
    jwt_keys: Keys,
}

fn run_migrations(
    connection: &mut impl MigrationHarness<Pg>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    // This will run the necessary migrations.
    //
    // See the documentation for `MigrationHarness` for
    // all available methods.
    connection.run_pending_migrations(MIGRATIONS)?;

    Ok(())
}

/// Reads the config and initializes the database and Redis connections
///
/// # Returns
/// An `AppState` struct with all the necessary members
///
/// # Errors
/// This function can fail if the config file is missing or invalid or the
/// connection to Postgres or Redis fails
async fn init_state(topdeck_config: Config) -> anyhow::Result<AppState> {
    let diesel_manager = AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(
        &topdeck_config.main.database,
    );
    let pool = Pool::builder(diesel_manager)
        .build()
        .context("Failed to build DB pool!")?;

    // clone the url because moving the value will screw things up
    let pg_url = topdeck_config.main.database.clone();
    tokio::task::spawn_blocking(move || {
        use diesel::prelude::Connection;
        use diesel_async::pg::AsyncPgConnection;
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&pg_url)
            .expect("Failed to establish DB connection for migrations!");

        run_migrations(&mut conn).expect("Failed to run migrations!");
    })
    .await?;

    let redis_cfg = RedisConfig::from_url(&topdeck_config.main.redis)?;
    let redis_builder = Builder::from_config(redis_cfg);

    let redis_pool = redis_builder
        .build_pool(3)
        .context("Failed to build Redis pool!")?;

    redis_pool
        .init()
        .await
        .context("Clients failed to connect to Redis!")?;

    let jwt_keys = Keys::new(topdeck_config.auth.jwt_secret.as_bytes());

    Ok(AppState {
        db: pool,
        redis: Arc::new(redis_pool),
        config: Arc::new(topdeck_config),
        jwt_keys,
    })
}

fn make_router(state: AppState) -> Router {
    let (api_router, openapi) = api::routes();

    Router::new()
        .nest("/api", api_router)
        .merge(Scalar::with_url("/api/docs", openapi))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn main() -> anyhow::Result<()> {
    let topdeck_config: Config = Figment::new()
        .merge(Toml::file("Topdeck.toml"))
        .merge(Env::prefixed("TOPDECK_"))
        .extract()
        .context("Config should be valid!")?;

    let file_appender = RollingFileAppender::builder()
        .filename_suffix("topdeck.log")
        .rotation(Rotation::DAILY)
        .build("./logs")
        .expect("Initializing logging failed");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                "topdeck=info,tower_http=error,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(stdout.and(non_blocking)))
        .init();

    debug!("Start init");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let state = init_state(topdeck_config.clone()).await?;

            // Parse CLI arguments
            // and if we have a management command, don't spin up a server
            let args = manager::Args::parse();
            if args.command.is_some() {
                return manager::parse_command(&args.command.unwrap(), state).await;
            }

            info!("Topdeck starting...");

            let listener = tokio::net::TcpListener::bind(&state.config.main.address)
                .await
                .context("Listener should always be able to listen!")?;
            info!("Listening on {}", &state.config.main.address);

            let app = make_router(state);

            axum::serve(listener, app.into_make_service())
                .await
                .context("Server should be able to... well, serve!")
        })
}
