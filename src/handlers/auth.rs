// src/handlers/auth.rs
use actix_web::{web, HttpRequest, HttpResponse};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{clock::DefaultClock, RateLimiter};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::config::Config;
use crate::utils::{extract_real_ip, verify_admin_password, RequestError};

#[derive(Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    ok: bool,
}

pub async fn handle_auth(
    req: HttpRequest,
    config: web::Data<Config>,
    payload: web::Json<AuthRequest>,
    rate_limiter: web::Data<RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>>,
) -> Result<HttpResponse, RequestError> {
    let ip = extract_real_ip(&req)?;

    if rate_limiter.check_key(&ip).is_err() {
        error!("Rate limit exceeded for auth from {}", ip);
        return Err(RequestError::RateLimitExceeded);
    }

    if payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(AuthResponse { ok: false }));
    }

    if verify_admin_password(&payload.password, &config.admin_password_hash) {
        debug!("Admin auth succeeded from {}", ip);
        Ok(HttpResponse::Ok().json(AuthResponse { ok: true }))
    } else {
        debug!("Admin auth rejected from {}", ip);
        Ok(HttpResponse::Unauthorized().json(AuthResponse { ok: false }))
    }
}
