#[derive(Clone)]
pub struct AppConfig {
    pub directory_base_url: String,
    pub places_base_url: String,
    pub directory_api_key: String,
    pub places_api_key: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("directory_base_url", &self.directory_base_url)
            .field("places_base_url", &self.places_base_url)
            .field("directory_api_key", &"[redacted]")
            .field("places_api_key", &"[redacted]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .finish()
    }
}
