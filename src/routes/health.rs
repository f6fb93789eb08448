use crate::storage::Storage;
use actix_web::{HttpResponse, web};

pub async fn health_check(storage: web::Data<Storage>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "health": true,
        "version": env!("CARGO_PKG_VERSION"),
        "storage": {
            "root_exists": storage.root().is_dir()
        }
    }))
}
