use std::env;

/// Application configuration loaded from environment variables.
///
/// Only the generative-model key is hard-required; every publish/notify
/// collaborator degrades to a no-op when its credentials are absent.
#[derive(Debug, Clone)]
pub struct Config {
    // Generative model
    pub model_api_key: String,
    pub text_model: String,
    pub flat_image_model: String,
    pub infographic_image_model: String,
    pub image_api_base_url: String,

    // Analytics provider
    pub analytics_base_url: Option<String>,
    pub analytics_property_id: Option<String>,
    pub analytics_api_key: Option<String>,

    // Local data directory (draft/report JSON, fallback image storage)
    pub data_dir: String,

    // Object storage
    pub storage_base_url: Option<String>,
    pub storage_bucket: String,
    pub storage_token: Option<String>,

    // CMS publish target (optional)
    pub cms_base_url: Option<String>,
    pub cms_username: Option<String>,
    pub cms_password: Option<String>,

    // Headless-store publish target (optional)
    pub headless_base_url: Option<String>,
    pub headless_api_key: Option<String>,
    pub headless_bucket: String,

    // Notifications (optional)
    pub slack_webhook_url: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            model_api_key: required_env("MODEL_API_KEY"),
            text_model: env::var("TEXT_MODEL").unwrap_or_else(|_| "gemini-2.5-pro".to_string()),
            flat_image_model: env::var("FLAT_IMAGE_MODEL")
                .unwrap_or_else(|_| "imagen-flat".to_string()),
            infographic_image_model: env::var("INFOGRAPHIC_IMAGE_MODEL")
                .unwrap_or_else(|_| "imagen-infographic".to_string()),
            image_api_base_url: env::var("IMAGE_API_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            analytics_base_url: env::var("ANALYTICS_BASE_URL").ok(),
            analytics_property_id: env::var("ANALYTICS_PROPERTY_ID").ok(),
            analytics_api_key: env::var("ANALYTICS_API_KEY").ok(),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            storage_base_url: env::var("STORAGE_BASE_URL").ok(),
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "article-images".to_string()),
            storage_token: env::var("STORAGE_TOKEN").ok(),
            cms_base_url: env::var("CMS_BASE_URL").ok(),
            cms_username: env::var("CMS_USERNAME").ok(),
            cms_password: env::var("CMS_PASSWORD").ok(),
            headless_base_url: env::var("HEADLESS_BASE_URL").ok(),
            headless_api_key: env::var("HEADLESS_API_KEY").ok(),
            headless_bucket: env::var("HEADLESS_BUCKET")
                .unwrap_or_else(|_| "article-images".to_string()),
            slack_webhook_url: env::var("SLACK_WEBHOOK_URL").ok(),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
