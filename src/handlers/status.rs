// src/handlers/status.rs
use actix_web::{web, HttpResponse};

use crate::status::cache::StatusCache;
use crate::utils::RequestError;

/// Serve the cached probe result. Never touches the network; readers get
/// whatever the refresh loop last stored.
pub async fn get_status(cache: web::Data<StatusCache>) -> Result<HttpResponse, RequestError> {
    Ok(HttpResponse::Ok().json(cache.snapshot()))
}
