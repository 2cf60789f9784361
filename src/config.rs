use std::time::Duration;

pub static API_BASE_URL: &str = match option_env!("EXCELLENCE_API_URL") {
	Some(url) => url,
	None => "https://excellence-choge.onrender.com/api",
};
pub static TOKEN_KEY: &str = "authToken";
pub static DRAFTS_KEY: &str = "learningMaterialDrafts";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
	#[error("invalid api base url {0:?}: {1}")]
	InvalidUrl(String, String),
	#[error("api base url {0:?} must use http or https")]
	UnsupportedScheme(String),
}

/// Settings shared by the http client, the session and the views.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	pub api_base_url: String,
	pub token_key: String,
	pub drafts_key: String,
	pub request_timeout: Duration,
	pub toast_duration: Duration,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_base_url: API_BASE_URL.trim_end_matches('/').to_owned(),
			token_key: TOKEN_KEY.to_owned(),
			drafts_key: DRAFTS_KEY.to_owned(),
			request_timeout: REQUEST_TIMEOUT,
			toast_duration: TOAST_DURATION,
		}
	}
}

impl Config {
	pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
		let parsed = url::Url::parse(base_url)
			.map_err(|err| ConfigError::InvalidUrl(base_url.to_owned(), err.to_string()))?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme(base_url.to_owned()));
		}
		self.api_base_url = base_url.trim_end_matches('/').to_owned();
		Ok(self)
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}
}
