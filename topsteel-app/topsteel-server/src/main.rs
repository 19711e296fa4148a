use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use topsteel_api::{create_router, AppState, Repositories, StateOptions};
use topsteel_core::repositories::CacheStore;
use topsteel_infrastructure::{
    create_pool, run_migrations, PgMenuConfigurationRepository, PgMenuItemRepository,
    PgParameterRepository, PgUserMenuPreferenceRepository, RedisCache,
};
use topsteel_security::JwtService;
use topsteel_shared::config::AppConfig;
use topsteel_shared::constants::DEFAULT_CUSTOM_MENU_TTL_SECS;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize telemetry; the guard flushes the file sink on exit
    let _log_guard = topsteel_shared::telemetry::init_telemetry(&config.log)?;

    info!("TopSteel server starting ({})...", config.app.env);

    // Connect to Database
    let pool = create_pool(&config.database).await?;
    info!("Database connection established.");

    if config.database.run_migrations {
        run_migrations(&pool).await?;
        info!("Database migrations applied.");
    }

    // Shared cache is optional
    let cache: Option<Arc<dyn CacheStore>> = match &config.redis {
        Some(settings) => match RedisCache::new(settings) {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                warn!("Redis cache disabled: {}", e);
                None
            }
        },
        None => None,
    };

    let repos = Repositories {
        configurations: Arc::new(PgMenuConfigurationRepository::new(pool.clone())),
        items: Arc::new(PgMenuItemRepository::new(pool.clone())),
        preferences: Arc::new(PgUserMenuPreferenceRepository::new(pool.clone())),
        parameters: Arc::new(PgParameterRepository::new(pool)),
    };

    let options = StateOptions {
        fallback_to_default: config.menu.fallback_to_default,
        custom_menu_ttl_secs: config
            .redis
            .as_ref()
            .map(|r| r.custom_menu_ttl_secs)
            .unwrap_or(DEFAULT_CUSTOM_MENU_TTL_SECS),
        parameter_cache_ttl_secs: config.parameters.cache_ttl_secs,
    };

    let state = AppState::new(repos, cache, JwtService::new(config.jwt.secret.clone()), options);

    // Seed the built-in menu on an empty database
    match state.menu_definitions.list_configurations().await {
        Ok(configs) if configs.is_empty() => {
            let created = state.menu_definitions.create_default_configuration().await?;
            info!("Seeded default menu configuration {}", created.id);
        }
        Ok(_) => {}
        Err(e) => error!("Could not check menu configurations: {}", e),
    }

    // Sweep expired parameter groups in the background
    let parameters = state.parameters.clone();
    let sweep_every = Duration::from_secs(config.parameters.cache_ttl_secs.max(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            parameters.cleanup_expired();
        }
    });

    let app = create_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
