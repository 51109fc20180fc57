use std::{io, path::PathBuf};

use actix_web::{get, http::header::ContentType, web, HttpResponse};

use crate::{error::ApiError, routes::blocking, store::StoreError};

/// Directory the cashier pages are served from.
#[derive(Debug, Clone)]
pub struct PagesDir(pub PathBuf);

const CASHIER_PAGE: &str = "Pentol.html";
const HISTORY_PAGE: &str = "riwayat.html";

async fn serve(pages: web::Data<PagesDir>, name: &'static str) -> Result<HttpResponse, ApiError> {
    let path = pages.0.join(name);

    let html = blocking(move || match std::fs::read(&path) {
        Ok(html) => Ok(html),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Page {} is missing", path.display());
            Err(ApiError::NotFound(format!("{} not found", name)))
        }
        Err(source) => {
            Err(ApiError::from(StoreError::Io { path, source }).context("Failed to read page"))
        }
    })
    .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html))
}

#[get("/")]
async fn index(pages: web::Data<PagesDir>) -> Result<HttpResponse, ApiError> {
    serve(pages, CASHIER_PAGE).await
}

#[get("/Pentol.html")]
async fn cashier_page(pages: web::Data<PagesDir>) -> Result<HttpResponse, ApiError> {
    serve(pages, CASHIER_PAGE).await
}

#[get("/riwayat.html")]
async fn history_page(pages: web::Data<PagesDir>) -> Result<HttpResponse, ApiError> {
    serve(pages, HISTORY_PAGE).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(cashier_page).service(history_page);
}
