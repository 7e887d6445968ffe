use clap::Parser;

use crate::configuration::Configuration;

#[derive(Debug, Clone, Parser)]
#[command(about = "Student-counselor appointment scheduling service")]
pub struct ConfigurationHandler {
    /// Port to listen on
    #[arg(long, default_value = "3000")]
    port: String,

    /// PostgreSQL connection URL; without it timeslots and appointments are
    /// kept in memory only
    #[arg(long)]
    database_url: Option<String>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        let mut configuration = Self::parse();
        if configuration.database_url.is_none() {
            configuration.database_url = std::env::var("DATABASE_URL").ok();
        }
        configuration
    }
}

impl Configuration for ConfigurationHandler {
    fn port(&self) -> String {
        self.port.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }
}
