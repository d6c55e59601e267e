use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::config::Config;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({
            "status": "available",
            "system_info": { "environment": "development", "version": "0.1.0" }
        }))
    ),
    tag = "Health"
)]
pub async fn health(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "available",
        "system_info": {
            "environment": config.app_env,
            "version": VERSION,
        }
    }))
}
