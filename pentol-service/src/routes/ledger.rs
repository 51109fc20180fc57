use actix_web::{delete, get, post, web, HttpResponse};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    model::{next_free_id, remove_by_id, LedgerRecord},
    routes::blocking,
    transaction_log::{Outcome, TransactionLog},
};

const SAVE_FAILED: &str = "Failed to save transaction";

type Ledger = web::Data<TransactionLog<LedgerRecord>>;

#[tracing::instrument(name = "Saving transaction for /save_transaction request", skip(log, body))]
#[post("/save_transaction")]
async fn save_transaction(log: Ledger, body: web::Json<Value>) -> Result<HttpResponse, ApiError> {
    let mut record: LedgerRecord =
        serde_json::from_value(body.into_inner()).map_err(|e| {
            tracing::warn!("Rejected transaction: {}", e);
            ApiError::rejected(SAVE_FAILED, e)
        })?;

    let id = blocking(move || {
        log.update(|records| -> Result<_, ApiError> {
            let requested = record.transaction_id();
            let id = next_free_id(records, requested).ok_or_else(|| {
                ApiError::rejected(SAVE_FAILED, format!("no free transactionId above {}", requested))
            })?;
            if id != requested {
                tracing::info!("Duplicate transaction ID {} found, assigned new ID: {}", requested, id);
            }

            record.set_transaction_id(id);
            records.push(record);
            Ok(Outcome::Changed(id))
        })
    })
    .await
    .map_err(|e| e.context(SAVE_FAILED))?;

    tracing::info!("Transaction {} saved", id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Transaction saved successfully",
        "transactionId": id
    })))
}

#[tracing::instrument(name = "Listing transactions for /get_transactions request", skip(log))]
#[get("/get_transactions")]
async fn get_transactions(log: Ledger) -> Result<HttpResponse, ApiError> {
    let records = blocking(move || Ok(log.all()?)).await?;

    Ok(HttpResponse::Ok().json(records))
}

#[tracing::instrument(name = "Deleting transaction for /delete_transaction request", skip(log))]
#[delete("/delete_transaction/{transaction_id}")]
async fn delete_transaction(log: Ledger, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let transaction_id = path.into_inner();

    let removed = blocking(move || {
        log.update(|records| -> Result<_, ApiError> {
            Ok(match remove_by_id(records, transaction_id) {
                0 => Outcome::Unchanged(0),
                n => Outcome::Changed(n),
            })
        })
    })
    .await?;

    if removed == 0 {
        return Err(ApiError::NotFound(format!(
            "Transaction {} not found",
            transaction_id
        )));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Transaction {} deleted successfully", transaction_id)
    })))
}

#[tracing::instrument(name = "Clearing transactions", skip(log))]
async fn clear_transactions(log: Ledger) -> Result<HttpResponse, ApiError> {
    blocking(move || Ok(log.clear()?)).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "All transactions cleared successfully"
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(super::json_config())
        .service(save_transaction)
        .service(get_transactions)
        .service(delete_transaction)
        .service(
            web::resource(["/clear_transactions", "/delete_all_transactions"])
                .route(web::delete().to(clear_transactions)),
        );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::store::InMemoryStore;

    fn ledger_with(records: Value) -> web::Data<TransactionLog<LedgerRecord>> {
        let records: Vec<LedgerRecord> = serde_json::from_value(records).unwrap();
        web::Data::new(TransactionLog::new(InMemoryStore::with_records(records)))
    }

    #[actix_web::test]
    async fn saving_a_duplicate_id_bumps_it_past_existing_ones() {
        // Given
        let log = ledger_with(json!([{"transactionId": 1}, {"transactionId": 2}]));
        let app = test::init_service(App::new().app_data(log.clone()).configure(configure)).await;

        // When
        let request = test::TestRequest::post()
            .uri("/save_transaction")
            .set_json(json!({"transactionId": 1, "totalAmount": 15000}))
            .to_request();
        let response = test::call_service(&app, request).await;

        // Then
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["transactionId"], 3);
        let stored = log.all().unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[2].transaction_id(), 3);
        assert_eq!(stored[2].fields()["totalAmount"], 15000);
        assert_eq!(stored[2].fields()["transactionId"], 3);
    }

    #[actix_web::test]
    async fn saving_without_an_id_is_rejected() {
        // Given
        let log = ledger_with(json!([]));
        let app = test::init_service(App::new().app_data(log.clone()).configure(configure)).await;

        // When
        let request = test::TestRequest::post()
            .uri("/save_transaction")
            .set_json(json!({"items": ["pentol"]}))
            .to_request();
        let response = test::call_service(&app, request).await;

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], SAVE_FAILED);
        assert!(body["error"].as_str().unwrap().contains("transactionId"));
        assert!(log.all().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn delete_removes_every_record_with_the_id() {
        // Given
        let log = ledger_with(json!([
            {"transactionId": 4, "n": 1},
            {"transactionId": 5},
            {"transactionId": 4, "n": 2}
        ]));
        let app = test::init_service(App::new().app_data(log.clone()).configure(configure)).await;

        // When
        let request = test::TestRequest::delete()
            .uri("/delete_transaction/4")
            .to_request();
        let response = test::call_service(&app, request).await;

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let ids: Vec<i64> = log.all().unwrap().iter().map(|r| r.transaction_id()).collect();
        assert_eq!(ids, vec![5]);
    }

    #[actix_web::test]
    async fn delete_of_unknown_id_is_not_found() {
        // Given
        let log = ledger_with(json!([{"transactionId": 1}]));
        let app = test::init_service(App::new().app_data(log.clone()).configure(configure)).await;

        // When
        let request = test::TestRequest::delete()
            .uri("/delete_transaction/9")
            .to_request();
        let response = test::call_service(&app, request).await;

        // Then
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Transaction 9 not found");
        assert_eq!(log.all().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn both_clear_routes_empty_the_log() {
        for uri in ["/clear_transactions", "/delete_all_transactions"] {
            // Given
            let log = ledger_with(json!([{"transactionId": 1}, {"transactionId": 2}]));
            let app =
                test::init_service(App::new().app_data(log.clone()).configure(configure)).await;

            // When
            let request = test::TestRequest::delete().uri(uri).to_request();
            let response = test::call_service(&app, request).await;

            // Then
            assert_eq!(response.status(), StatusCode::OK);
            assert!(log.all().unwrap().is_empty());
        }
    }
}
