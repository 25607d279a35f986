use actix_web::dev::Server;
use actix_web::{error, middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::routes::{auth_scope, health_check, posts_scope};
use crate::state::AppState;

/// Unparseable JSON bodies become the same 400 shape as schema failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!("Rejected request body: {}", err);
        error::Error::from(AppError::from(ValidationError::MalformedBody(err.to_string())))
    })
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let jwt_config = state.jwt.clone();
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())      // Standard logging
            .wrap(LoggerMiddleware)       // Request span + id

            // Shared state
            .app_data(state.clone())
            .app_data(json_config())

            .route("/health_check", web::get().to(health_check))
            .service(auth_scope(&jwt_config))
            .service(posts_scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
