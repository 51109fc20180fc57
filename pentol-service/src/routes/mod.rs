use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::ApiError;

pub mod cashier;
pub mod ledger;
pub mod pages;
pub mod sales;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Runs blocking log work on the actix blocking pool inside the current
/// request span. Storage failures are logged here, once.
pub(crate) async fn blocking<F, R>(work: F) -> Result<R, ApiError>
where
    F: FnOnce() -> Result<R, ApiError> + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();
    let result = web::block(move || span.in_scope(work)).await?;

    if let Err(e @ ApiError::Storage { .. }) = &result {
        tracing::error!("Transaction log failure: {}", e);
    }
    result
}

/// Turns unreadable JSON bodies into the same 400 every other validation uses.
pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        tracing::warn!("Rejected request body: {}", err);
        ApiError::invalid(err).into()
    })
}
