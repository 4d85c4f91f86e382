//! Manga Gateway API Server
//!
//! Main entry point for the manga gateway REST API service.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use manga_gateway::auth::AuthConfig;
use manga_gateway::catalog::{CatalogClient, HttpTransport, RetryConfig, RetryingTransport};
use manga_gateway::config::Config;
use manga_gateway::db::{Database, InMemoryUserStore, PgUserStore, UserStore};
use manga_gateway::fixtures::Fixtures;
use manga_gateway::routes::{configure_routes, ApiDoc, AppState};

/// Pick the user store: PostgreSQL when configured, otherwise in memory
///
/// The pool connects lazily, so an unreachable database does not stop startup;
/// user routes answer 503 until it comes back.
async fn open_user_store(config: &Config) -> (Arc<dyn UserStore>, Option<Database>) {
    let Some(url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, users are kept in memory and lost on restart");
        return (Arc::new(InMemoryUserStore::new()), None);
    };

    match Database::connect_lazy(url) {
        Ok(db) => {
            info!("Running database migrations...");
            match db.run_migrations().await {
                Ok(()) => info!("Database connected and migrations complete"),
                Err(e) => error!("Database not ready, user routes will fail until it is: {}", e),
            }
            (Arc::new(PgUserStore::new(db.pool().clone())), Some(db))
        }
        Err(e) => {
            error!("Invalid database configuration, falling back to memory: {}", e);
            (Arc::new(InMemoryUserStore::new()), None)
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::other(e)
    })?;
    let bind_address = config.bind_address();

    let (users, db) = open_user_store(&config).await;

    let transport = RetryingTransport::new(
        HttpTransport::new().map_err(io::Error::other)?,
        RetryConfig::default(),
    );
    let catalog = CatalogClient::new(Arc::new(transport), config.catalog_base_url.clone());
    let fixtures = Fixtures::load().map_err(io::Error::other)?;

    let auth_config = web::Data::new(AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
    });
    let app_state = web::Data::new(AppState::new(users, catalog, fixtures, config));

    info!("Starting Manga Gateway API server on {}", bind_address);

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .app_data(auth_config.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    if let Some(db) = db {
        db.close().await;
    }
    Ok(())
}
