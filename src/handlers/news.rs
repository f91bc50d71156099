// src/handlers/news.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::models::content::NewsPost;
use crate::storage::json::ContentStore;
use crate::utils::{now_unix, require_admin, RequestError};

const MAX_TITLE_LEN: usize = 200;

#[derive(Deserialize)]
pub struct NewsPayload {
    pub title: String,
    pub body: String,
}

fn validate(payload: &NewsPayload) -> Result<(), HttpResponse> {
    if payload.title.trim().is_empty() {
        return Err(HttpResponse::BadRequest().body("Invalid title: Must be at least 1 char."));
    }
    if payload.title.len() > MAX_TITLE_LEN {
        return Err(HttpResponse::BadRequest().body("Invalid title: Too long (max 200 chars)."));
    }
    Ok(())
}

pub async fn list_news(store: web::Data<ContentStore>) -> Result<HttpResponse, RequestError> {
    Ok(HttpResponse::Ok().json(store.list_news()))
}

pub async fn create_news(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<ContentStore>,
    payload: web::Json<NewsPayload>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&req, &config.admin_password_hash)?;

    if let Err(resp) = validate(&payload) {
        return Ok(resp);
    }

    let now = now_unix();
    let post = NewsPost {
        id: Uuid::new_v4().to_string(),
        title: payload.title.clone(),
        body: payload.body.clone(),
        created_at: now,
        updated_at: now,
    };

    store.upsert_news(post.clone()).map_err(|e| {
        error!("Failed to persist news post: {}", e);
        RequestError::Storage(e.to_string())
    })?;

    debug!("Created news post {}", post.id);
    Ok(HttpResponse::Ok().json(post))
}

pub async fn update_news(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<ContentStore>,
    path: web::Path<String>,
    payload: web::Json<NewsPayload>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&req, &config.admin_password_hash)?;

    if let Err(resp) = validate(&payload) {
        return Ok(resp);
    }

    let id = path.into_inner();
    let mut post = match store.get_news(&id) {
        Some(post) => post,
        None => {
            error!("News post not found: {}", id);
            return Ok(HttpResponse::NotFound().body("News post not found"));
        }
    };

    post.title = payload.title.clone();
    post.body = payload.body.clone();
    post.updated_at = now_unix();

    store.upsert_news(post.clone()).map_err(|e| {
        error!("Failed to persist news post: {}", e);
        RequestError::Storage(e.to_string())
    })?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_news(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<ContentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&req, &config.admin_password_hash)?;

    let id = path.into_inner();
    let removed = store.delete_news(&id).map_err(|e| {
        error!("Failed to persist news deletion: {}", e);
        RequestError::Storage(e.to_string())
    })?;

    if removed {
        debug!("Removed news post {}", id);
        Ok(HttpResponse::Ok().finish())
    } else {
        error!("News post not found: {}", id);
        Ok(HttpResponse::NotFound().body("News post not found"))
    }
}
