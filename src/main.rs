use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    configuration::Configuration, configuration_handler::ConfigurationHandler,
    database_store::DatabaseStore, http::create_app, local_store::LocalStore, notify::LogSink,
    profile::ProfileDirectory,
};

mod backend;
mod configuration;
mod configuration_handler;
mod database_store;
mod error;
mod http;
mod lifecycle;
mod local_store;
mod notify;
mod profile;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("######################");
    println!("# Guidance Scheduler #");
    println!("######################");

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    println!("Accessable at:\n{}", address.clone());
    let listener = tokio::net::TcpListener::bind(address).await.unwrap();

    let notifications = notify::spawn_dispatcher(LogSink);
    let profiles = ProfileDirectory::default();

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseStore::new(&database_url, notifications.clone()) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection: {database_url}. Retry in 1 sec. You may want to restart it with database disabled (impersistent scheduling state).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(backend, profiles)
    } else {
        let backend = LocalStore::new(notifications);
        create_app(backend, profiles)
    };

    axum::serve(listener, app).await.unwrap();
}
