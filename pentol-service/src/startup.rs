use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{ApiMode, Settings},
    model::{LedgerRecord, Sale, SalesEntry},
    routes::{self, pages::PagesDir},
    store::JsonFileStore,
    transaction_log::TransactionLog,
};

/// Route table of the ledger API. Expects a
/// `web::Data<TransactionLog<LedgerRecord>>` in the app data.
pub fn configure_ledger(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(routes::health_check))
        .route("/health_check", web::get().to(routes::health_check))
        .configure(routes::ledger::configure);
}

/// Route table of the cashier API and its pages. Expects a
/// `web::Data<TransactionLog<Sale>>` and a `web::Data<PagesDir>`.
pub fn configure_cashier(cfg: &mut web::ServiceConfig) {
    cfg.route("/health_check", web::get().to(routes::health_check))
        .configure(routes::cashier::configure)
        .configure(routes::pages::configure);
}

/// Route table of the sales history API. Expects a
/// `web::Data<TransactionLog<SalesEntry>>` in the app data.
pub fn configure_sales(cfg: &mut web::ServiceConfig) {
    cfg.route("/health_check", web::get().to(routes::health_check))
        .configure(routes::sales::configure);
}

#[derive(Clone)]
enum ModeData {
    Ledger(web::Data<TransactionLog<LedgerRecord>>),
    Cashier(web::Data<TransactionLog<Sale>>, web::Data<PagesDir>),
    Sales(web::Data<TransactionLog<SalesEntry>>),
}

pub fn run(listener: TcpListener, settings: &Settings) -> Result<Server, std::io::Error> {
    let store = JsonFileStore::new(&settings.storage.data_file);
    tracing::info!(
        data_file = %store.path().display(),
        mode = %settings.application.mode,
        "Opening transaction log"
    );

    let mode_data = match settings.application.mode {
        ApiMode::Ledger => ModeData::Ledger(web::Data::new(TransactionLog::new(store))),
        ApiMode::Cashier => ModeData::Cashier(
            web::Data::new(TransactionLog::new(store)),
            web::Data::new(PagesDir(settings.storage.pages_dir.clone())),
        ),
        ApiMode::Sales => ModeData::Sales(web::Data::new(TransactionLog::new(store))),
    };

    let server = HttpServer::new(move || {
        let app = App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .send_wildcard()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .wrap(TracingLogger::default());

        match &mode_data {
            ModeData::Ledger(log) => app.app_data(log.clone()).configure(configure_ledger),
            ModeData::Cashier(log, pages) => app
                .app_data(log.clone())
                .app_data(pages.clone())
                .configure(configure_cashier),
            ModeData::Sales(log) => app.app_data(log.clone()).configure(configure_sales),
        }
    })
    .listen(listener)?
    .run();

    Ok(server)
}
