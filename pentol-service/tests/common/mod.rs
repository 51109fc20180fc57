#![allow(dead_code)]

use std::{net::TcpListener, path::PathBuf};

use once_cell::sync::Lazy;
use pentol_service::{
    configuration::{get_configuration, ApiMode},
    telemetry::{get_subscriber, init_subscriber},
};
use rand::Rng;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to set subscriber.");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to set subscriber.");
    };
});

pub struct TestApp {
    pub address: String,
    pub data_file: PathBuf,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get_transactions(&self) -> Vec<serde_json::Value> {
        self.client
            .get(self.url("/get_transactions"))
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .expect("Failed to deserialize response")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(dir) = self.data_file.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

pub async fn spawn_app(mode: ApiMode) -> TestApp {
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let test_id: u32 = rand::thread_rng().gen();
    let data_file = std::env::temp_dir()
        .join(format!("pentol-test-{}", test_id))
        .join("transactions.json");

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.application.mode = mode;
    configuration.storage.data_file = data_file.clone();
    configuration.storage.pages_dir = PathBuf::from("static");

    let server =
        pentol_service::run(listener, &configuration).expect("Server initialization failed.");

    tokio::spawn(server);

    TestApp {
        address,
        data_file,
        client: reqwest::Client::new(),
    }
}
