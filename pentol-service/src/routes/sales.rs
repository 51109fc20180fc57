use actix_web::{delete, get, post, web, HttpResponse};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    model::{next_row_id, SaleRejection, SalesEntry, SalesRequest},
    routes::blocking,
    transaction_log::{Outcome, TransactionLog},
};

type History = web::Data<TransactionLog<SalesEntry>>;

fn rejected(rejection: SaleRejection) -> ApiError {
    tracing::warn!("Rejected sale: {:?}", rejection);
    match rejection {
        SaleRejection::MissingFields => ApiError::invalid("Missing required fields"),
        SaleRejection::InvalidField(field) => ApiError::invalid(format!("Invalid value for {}", field)),
    }
}

#[tracing::instrument(name = "Adding sale for /sales request", skip(log, body))]
#[post("/sales")]
async fn add_sale(log: History, body: web::Json<Value>) -> Result<HttpResponse, ApiError> {
    let body = match body.into_inner() {
        body @ Value::Object(_) => body,
        _ => return Err(rejected(SaleRejection::MissingFields)),
    };
    let request: SalesRequest =
        serde_json::from_value(body).map_err(|e| ApiError::invalid(e.to_string()))?;
    let mut entry = request.into_entry(0).map_err(rejected)?;

    let transaction_id = blocking(move || {
        log.update(|entries| -> Result<_, ApiError> {
            if entries.iter().any(|e| e.transaction_id == entry.transaction_id) {
                tracing::warn!("Transaction ID {} already exists", entry.transaction_id);
                return Err(ApiError::Conflict("Transaction ID already exists".to_string()));
            }
            entry.id = next_row_id(entries);
            let transaction_id = entry.transaction_id.clone();
            entries.push(entry);
            Ok(Outcome::Changed(transaction_id))
        })
    })
    .await
    .map_err(|e| e.context("Failed to add sale"))?;

    tracing::info!("Sale {} added", transaction_id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Sale added successfully"
    })))
}

#[tracing::instrument(name = "Listing sales for /sales request", skip(log))]
#[get("/sales")]
async fn get_sales(log: History) -> Result<HttpResponse, ApiError> {
    let mut entries = blocking(move || Ok(log.all()?))
        .await
        .map_err(|e| e.context("Failed to retrieve sales"))?;
    entries.sort_by(|a, b| b.id.cmp(&a.id));

    Ok(HttpResponse::Ok().json(entries))
}

#[tracing::instrument(name = "Deleting sale for /sales request", skip(log))]
#[delete("/sales/{transaction_id}")]
async fn delete_sale(log: History, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let transaction_id = path.into_inner();
    let key = transaction_id.clone();

    let removed = blocking(move || {
        log.update(|entries| -> Result<_, ApiError> {
            let before = entries.len();
            entries.retain(|e| e.transaction_id != key);
            Ok(match before - entries.len() {
                0 => Outcome::Unchanged(0),
                n => Outcome::Changed(n),
            })
        })
    })
    .await
    .map_err(|e| e.context("Failed to delete sale"))?;

    if removed == 0 {
        return Err(ApiError::NotFound("Transaction not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Transaction {} deleted successfully", transaction_id)
    })))
}

#[tracing::instrument(name = "Deleting all sales", skip(log))]
#[delete("/sales")]
async fn delete_all_sales(log: History) -> Result<HttpResponse, ApiError> {
    let removed = blocking(move || {
        log.update(|entries| -> Result<_, ApiError> {
            Ok(match entries.len() {
                0 => Outcome::Unchanged(0),
                n => {
                    entries.clear();
                    Outcome::Changed(n)
                }
            })
        })
    })
    .await
    .map_err(|e| e.context("Failed to delete all sales"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("All sales history deleted ({} rows affected)", removed)
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(super::json_config())
        .service(add_sale)
        .service(get_sales)
        .service(delete_sale)
        .service(delete_all_sales);
}
