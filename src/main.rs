use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trending_service::config::Config;
use trending_service::db::{PgPostStore, PgStatStore, StatPriors};
use trending_service::events::EventPublisher;
use trending_service::handlers::{self, TrendingState};
use trending_service::jobs::DecayJob;
use trending_service::services::TrendingService;

async fn health(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "service": "trending-service",
        })),
        Err(e) => {
            error!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "trending-service",
            }))
        }
    }
}

async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "alive" }))
}

async fn readiness(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "status": "ready" })),
        Err(_) => {
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "status": "not_ready" }))
        }
    }
}

fn build_cors(allowed_origins: &str) -> Cors {
    if allowed_origins.trim() == "*" {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600)
    } else {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        for origin in allowed_origins.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            cors = cors.allowed_origin(origin);
        }
        cors
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,trending_service=debug,sqlx=warn,actix_web=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        env = %config.app.env,
        port = config.app.port,
        "Starting trending-service"
    );

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let priors = StatPriors {
        alpha0: config.trending.alpha0,
        beta0: config.trending.beta0,
    };
    let posts = Arc::new(PgPostStore::new(pool.clone()));
    let stats = Arc::new(PgStatStore::new(pool.clone(), priors));
    let events = EventPublisher::default();

    let service = Arc::new(TrendingService::new(
        posts,
        stats.clone(),
        events,
        config.trending.clone(),
    ));

    let decay_job = Arc::new(DecayJob::new(stats, config.decay.clone()));
    tokio::spawn(decay_job.run());

    let bind_addr = (config.app.host.clone(), config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();
    let pool_data = web::Data::new(pool);
    let state = web::Data::new(TrendingState {
        service: service.clone(),
    });

    info!(host = %bind_addr.0, port = bind_addr.1, "Binding HTTP server");

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&allowed_origins))
            .wrap(TracingLogger::default())
            .wrap(Logger::default())
            .app_data(pool_data.clone())
            .app_data(state.clone())
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(health))
                    .route("/health/live", web::get().to(liveness))
                    .route("/health/ready", web::get().to(readiness))
                    .service(
                        web::scope("/trending")
                            .route("", web::get().to(handlers::get_trending))
                            .route(
                                "/events/impression",
                                web::post().to(handlers::track_impression),
                            )
                            .route("/events/click", web::post().to(handlers::track_click))
                            .route(
                                "/events/read-end",
                                web::post().to(handlers::track_read_end),
                            ),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
