//! Default values for configuration

/// Default listening-practice backend URL
pub fn default_listen_base_url() -> String {
    std::env::var("LEXREPORT_LISTEN_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
}

/// Default environment variable name for the word-list API key
pub fn default_listen_api_key_env() -> String {
    "LEXREPORT_API_KEY".to_string()
}

/// Fallback filename when the backend sends no Content-Disposition
pub fn default_practice_filename() -> String {
    "listening_practice.mp3".to_string()
}

/// Default report backend URL (includes the /report prefix)
pub fn default_report_base_url() -> String {
    std::env::var("LEXREPORT_REPORT_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8000/report".to_string())
}

/// Default page size for list endpoints
pub fn default_report_page_size() -> u32 {
    100
}

/// Default user agent
pub fn default_user_agent() -> String {
    format!("lexreport/{}", env!("CARGO_PKG_VERSION"))
}
