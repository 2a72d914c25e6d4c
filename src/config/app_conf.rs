use std::env;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL of the deployed site, used to build the
    /// status-page link embedded in confirmation emails.
    pub site_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let site_base_url = env::var("SITE_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));
        AppConfig {
            host,
            port,
            site_base_url,
        }
    }
}
