use actix_web::{delete, get, post, web, HttpResponse};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    model::{remove_at, Sale, SaleRejection, SaleRequest},
    routes::blocking,
    transaction_log::{Outcome, TransactionLog},
};

type Register = web::Data<TransactionLog<Sale>>;

impl From<SaleRejection> for ApiError {
    fn from(rejection: SaleRejection) -> Self {
        match rejection {
            SaleRejection::MissingFields => ApiError::invalid("Data tidak lengkap"),
            SaleRejection::InvalidField(field) => {
                ApiError::invalid(format!("Format data tidak valid: {}", field))
            }
        }
    }
}

#[tracing::instrument(name = "Processing sale for /process_transaction request", skip(log, body))]
#[post("/process_transaction")]
async fn process_transaction(log: Register, body: web::Json<Value>) -> Result<HttpResponse, ApiError> {
    // Only an object carries named fields, an array would map to them by position
    let body = match body.into_inner() {
        body @ Value::Object(_) => body,
        _ => return Err(SaleRejection::MissingFields.into()),
    };
    let request: SaleRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::invalid(format!("Format data tidak valid: {}", e)))?;
    let sale = request.into_sale().map_err(|rejection| {
        tracing::warn!("Rejected sale: {:?}", rejection);
        ApiError::from(rejection)
    })?;

    tracing::info!(
        product = %sale.product_name,
        quantity = sale.quantity,
        total_price = sale.total_price,
        "Recording sale"
    );
    let change = sale.change;

    blocking(move || {
        log.update(|sales| -> Result<_, ApiError> {
            sales.push(sale);
            Ok(Outcome::Changed(()))
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Transaksi berhasil diproses",
        "change": change
    })))
}

#[tracing::instrument(name = "Listing sales for /get_transactions request", skip(log))]
#[get("/get_transactions")]
async fn get_transactions(log: Register) -> Result<HttpResponse, ApiError> {
    let sales = blocking(move || Ok(log.all()?)).await?;

    Ok(HttpResponse::Ok().json(sales))
}

#[tracing::instrument(name = "Deleting sale for /delete_transaction request", skip(log))]
#[delete("/delete_transaction/{index}")]
async fn delete_transaction(log: Register, path: web::Path<usize>) -> Result<HttpResponse, ApiError> {
    let index = path.into_inner();

    let deleted = blocking(move || {
        log.update(|sales| -> Result<_, ApiError> {
            Ok(match remove_at(sales, index) {
                Some(sale) => Outcome::Changed(Some(sale)),
                None => Outcome::Unchanged(None),
            })
        })
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Transaksi tidak ditemukan".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Transaksi berhasil dihapus",
        "deleted": deleted
    })))
}

#[tracing::instrument(name = "Clearing sales", skip(log))]
async fn clear_transactions(log: Register) -> Result<HttpResponse, ApiError> {
    blocking(move || Ok(log.clear()?)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Semua transaksi berhasil dihapus"
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(super::json_config())
        .service(process_transaction)
        .service(get_transactions)
        .service(delete_transaction)
        .service(
            web::resource(["/clear_transactions", "/delete_all_transactions"])
                .route(web::delete().to(clear_transactions)),
        );
}
