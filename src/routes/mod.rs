pub mod files;
pub mod health;
pub mod ui;

use crate::errors::ApiError;
use actix_web::web;

/// Route table shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("invalid request body: {err}")).into()
    }))
    .route("/", web::get().to(ui::index))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/upload", web::post().to(files::upload_file))
            .route("/files", web::get().to(files::list_files))
            .route("/rename", web::post().to(files::rename_file))
            .route("/download/{filename}", web::get().to(files::download_file)),
    );
}
