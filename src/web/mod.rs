mod handlers;
mod state;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::config::AppConfig;
use crate::db::Database;

pub use state::AppState;

fn cors(origins: &[String]) -> Cors {
    origins.iter().fold(
        Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        |cors, origin| {
            if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            }
        },
    )
}

/// Serve the JSON API until the process is stopped.
pub async fn start_server(config: AppConfig, db: Database) -> std::io::Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let json_limit = config.server.json_limit;
    let origins = config.server.cors_origins.clone();
    let data = web::Data::new(AppState::new(db, config));

    tracing::info!("Starting kayulog API on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .app_data(handlers::json_config(json_limit))
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
