use std::io;

use actix_cors::Cors;
use actix_web::{
    middleware::{Logger, NormalizePath},
    web, App, HttpServer,
};

use taskmaster::{config::Config, db, logger, routes, storage::Storage, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config =
        Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    logger::init(config.environment).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let pool = db::connect(&config.database).await.map_err(|e| {
        log::error!("failed to connect to database: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    db::migrate(&pool).await.map_err(|e| {
        log::error!("failed to run migrations: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let state = web::Data::new(AppState::new(Storage::postgres(pool), config.jwt_secret.clone()));

    log::info!("Starting Taskmaster server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .app_data(state.clone())
            .configure(routes::config)
            .default_service(web::to(routes::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
