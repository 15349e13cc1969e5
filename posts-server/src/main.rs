use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::post_service::PostService;
use data::post_repository::DynPostRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use domain::calendar::Calendar;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let repo: DynPostRepository = Arc::new(PostgresPostRepository::new(pool.clone()));
    let post_service = PostService::new(repo, Calendar::new(settings.day_boundary_offset));
    let jwt = JwtService::new(&settings.jwt_secret);
    let state = AppState::new(Arc::new(post_service), Arc::new(jwt));

    let served = server::run_http(&settings, state).await;

    pool.close().await;
    info!("database pool closed");
    served
}
