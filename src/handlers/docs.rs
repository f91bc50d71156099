// src/handlers/docs.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::models::content::DocPage;
use crate::storage::json::ContentStore;
use crate::utils::{now_unix, require_admin, RequestError};

#[derive(Deserialize)]
pub struct DocPayload {
    pub title: String,
    pub body: String,
}

pub async fn list_docs(store: web::Data<ContentStore>) -> Result<HttpResponse, RequestError> {
    Ok(HttpResponse::Ok().json(store.list_docs()))
}

pub async fn create_doc(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<ContentStore>,
    payload: web::Json<DocPayload>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&req, &config.admin_password_hash)?;

    if payload.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("Invalid title: Must be at least 1 char."));
    }

    let page = DocPage {
        id: Uuid::new_v4().to_string(),
        title: payload.title.clone(),
        body: payload.body.clone(),
        updated_at: now_unix(),
    };

    store.upsert_doc(page.clone()).map_err(|e| {
        error!("Failed to persist doc page: {}", e);
        RequestError::Storage(e.to_string())
    })?;

    debug!("Created doc page {}", page.id);
    Ok(HttpResponse::Ok().json(page))
}

pub async fn update_doc(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<ContentStore>,
    path: web::Path<String>,
    payload: web::Json<DocPayload>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&req, &config.admin_password_hash)?;

    if payload.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("Invalid title: Must be at least 1 char."));
    }

    let id = path.into_inner();
    let mut page = match store.get_doc(&id) {
        Some(page) => page,
        None => {
            error!("Doc page not found: {}", id);
            return Ok(HttpResponse::NotFound().body("Doc page not found"));
        }
    };

    page.title = payload.title.clone();
    page.body = payload.body.clone();
    page.updated_at = now_unix();

    store.upsert_doc(page.clone()).map_err(|e| {
        error!("Failed to persist doc page: {}", e);
        RequestError::Storage(e.to_string())
    })?;

    Ok(HttpResponse::Ok().json(page))
}

pub async fn delete_doc(
    req: HttpRequest,
    config: web::Data<Config>,
    store: web::Data<ContentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    require_admin(&req, &config.admin_password_hash)?;

    let id = path.into_inner();
    let removed = store.delete_doc(&id).map_err(|e| {
        error!("Failed to persist doc deletion: {}", e);
        RequestError::Storage(e.to_string())
    })?;

    if removed {
        debug!("Removed doc page {}", id);
        Ok(HttpResponse::Ok().finish())
    } else {
        error!("Doc page not found: {}", id);
        Ok(HttpResponse::NotFound().body("Doc page not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sha256_hex;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_docs_crud_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            admin_password_hash: sha256_hex("secret"),
            ..Config::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ContentStore::load(dir.path()).unwrap()))
                .app_data(web::Data::new(config))
                .route("/docs", web::get().to(list_docs))
                .route("/docs", web::post().to(create_doc))
                .route("/docs/{id}", web::put().to(update_doc))
                .route("/docs/{id}", web::delete().to(delete_doc)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/docs")
            .insert_header(("X-Admin-Password", "secret"))
            .set_json(json!({ "title": "Rules", "body": "Be nice." }))
            .to_request();
        let created: DocPage = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created.title, "Rules");

        let req = test::TestRequest::put()
            .uri(&format!("/docs/{}", created.id))
            .insert_header(("X-Admin-Password", "secret"))
            .set_json(json!({ "title": "Server rules", "body": "Be nice." }))
            .to_request();
        let updated: DocPage = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.title, "Server rules");

        let req = test::TestRequest::get().uri("/docs").to_request();
        let pages: Vec<DocPage> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(pages.len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/docs/{}", created.id))
            .insert_header(("X-Admin-Password", "secret"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_docs_mutations_require_admin_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            admin_password_hash: sha256_hex("secret"),
            ..Config::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ContentStore::load(dir.path()).unwrap()))
                .app_data(web::Data::new(config))
                .route("/docs", web::post().to(create_doc)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/docs")
            .set_json(json!({ "title": "x", "body": "y" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
