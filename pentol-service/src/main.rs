use std::net::TcpListener;

use pentol_service::{
    configuration::get_configuration,
    run,
    telemetry::{get_subscriber, init_subscriber},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().map_err(std::io::Error::other)?;

    let subscriber = get_subscriber(
        "pentol-service".into(),
        configuration.application.log_level.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber).map_err(std::io::Error::other)?;

    let address = configuration.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!(
        "Serving the {} API on {}",
        configuration.application.mode,
        address
    );

    run(listener, &configuration)?.await
}
