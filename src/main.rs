use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use edu_admin_service::config::AppConfig;
use edu_admin_service::state::AppState;
use edu_admin_service::utils::validation::{json_config, query_config};
use edu_admin_service::{api, configure, middleware, seeds};

fn cors(origins: &[String]) -> Cors {
    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins.iter().fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    log::info!("🚀 Starting Education Admin Service...");

    let state = AppState::from_config(&config).await.map_err(|e| {
        log::error!("❌ Startup failed: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    if let Err(e) = state.ensure_indexes().await {
        log::warn!("⚠️  Could not create unique indexes: {}", e);
    }

    // 🌱 Seed default home-screen content
    if config.seed_catalogs {
        seeds::showcase_seed::seed_showcase(&state).await;
    }

    let state_data = web::Data::new(state);
    let bind_address = config.bind_address();
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);
    log::info!("📄 OpenAPI spec at: http://{}/api-docs/openapi.json", bind_address);

    // Generate OpenAPI specification
    let openapi = api::swagger::ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(cors(&cors_origins))
            .wrap(middleware::SecurityHeaders)
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
