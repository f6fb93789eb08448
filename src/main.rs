mod config;
mod errors;
mod models;
mod naming;
mod routes;
mod storage;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use crate::config::Config;
use crate::storage::Storage;
use actix_web::middleware::Logger;
use actix_web::http::header;
use actix_web::web::Data;
use env_logger::Env;

fn cors_for(cfg: &Config) -> Cors {
    if cfg.allowed_origins.is_empty() {
        return Cors::permissive();
    }
    cfg.allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Init logger to show info by default, but can be overridden by RUST_LOG
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cfg = Config::from_args_env()?;

    // the uploads dir is created lazily by the first upload
    let storage = Storage::new(&cfg.uploads_dir);
    log::info!("Serving files from {}", storage.root().display());
    log::info!("Starting server at {}", cfg.listen);

    let listen_addr = cfg.listen.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors_for(&cfg))
            .app_data(Data::new(cfg.clone()))
            .app_data(Data::new(storage.clone()))
            .configure(routes::configure)
    })
    .bind(listen_addr)?
    .run()
    .await?;
    Ok(())
}
