use crate::config::Config;
use futures_util::future::{self, Either};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{cell::RefCell, rc::Rc, time::Duration};

mod error;
pub use error::*;
mod transport;
pub use transport::*;

#[cfg(test)]
pub mod fake;

/// Standard response wrapper used by every endpoint of the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub message: Option<String>,
	pub data: T,
	#[serde(default)]
	pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Meta {
	#[serde(default)]
	pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
	pub current: u32,
	pub pages: u32,
	pub total: u64,
}

#[derive(Deserialize)]
struct ErrorBody {
	#[serde(default)]
	message: Option<String>,
}

/// Raw bytes of a downloaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
	pub file_name: Option<String>,
	pub mime: Option<String>,
	pub bytes: Vec<u8>,
}

pub struct HttpClient {
	base_url: String,
	transport: Rc<dyn Transport>,
	token: RefCell<Option<String>>,
	timeout: Duration,
}

impl std::fmt::Debug for HttpClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HttpClient")
			.field("base_url", &self.base_url)
			.field("authenticated", &self.token.borrow().is_some())
			.field("timeout", &self.timeout)
			.finish()
	}
}

impl HttpClient {
	pub fn new(config: &Config, transport: Rc<dyn Transport>) -> Self {
		Self {
			base_url: config.api_base_url.clone(),
			transport,
			token: RefCell::new(None),
			timeout: config.request_timeout,
		}
	}

	pub fn token(&self) -> Option<String> {
		self.token.borrow().clone()
	}

	pub(crate) fn set_token(&self, token: Option<String>) {
		*self.token.borrow_mut() = token;
	}

	pub fn get<T>(&self, path: impl Into<String>) -> Call<'_, T> {
		Call::new(self, Method::GET, path.into())
	}

	pub fn post<T>(&self, path: impl Into<String>) -> Call<'_, T> {
		Call::new(self, Method::POST, path.into())
	}

	pub fn patch<T>(&self, path: impl Into<String>) -> Call<'_, T> {
		Call::new(self, Method::PATCH, path.into())
	}

	pub fn delete<T>(&self, path: impl Into<String>) -> Call<'_, T> {
		Call::new(self, Method::DELETE, path.into())
	}

	async fn execute(&self, request: RawRequest) -> Result<RawResponse, ApiError> {
		log::debug!(target: "http", "{} {}", request.method, request.url);
		let send = self.transport.send(request);
		let timeout = Box::pin(fluvio_wasm_timer::Delay::new(self.timeout));
		match future::select(send, timeout).await {
			Either::Left((Ok(response), _)) => Ok(response),
			Either::Left((Err(err), _)) => {
				log::warn!(target: "http", "transport failure: {err}");
				Err(ApiError::Transport(err.0))
			}
			Either::Right(_) => {
				log::warn!(target: "http", "request exceeded {:?}", self.timeout);
				Err(ApiError::Timeout(self.timeout))
			}
		}
	}
}

/// Percent-encodes an identifier so it can be used as a single path segment.
pub fn segment(value: &str) -> String {
	urlencoding::encode(value).into_owned()
}

/// A request under construction. `T` is the decoded body type.
pub struct Call<'c, T> {
	client: &'c HttpClient,
	method: Method,
	path: String,
	params: Vec<(String, String)>,
	body: Body,
	marker: std::marker::PhantomData<T>,
}

impl<'c, T> std::fmt::Debug for Call<'c, T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.method, self.path)
	}
}

impl<'c, T> Call<'c, T> {
	fn new(client: &'c HttpClient, method: Method, path: String) -> Self {
		Self {
			client,
			method,
			path,
			params: Vec::new(),
			body: Body::Empty,
			marker: Default::default(),
		}
	}

	pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
		self.params.push((key.to_owned(), value.to_string()));
		self
	}

	pub fn with_json<Q>(mut self, json: &Q) -> Self
	where
		Q: Serialize + ?Sized,
	{
		// Serializing plain data structures into a Vec cannot fail.
		self.body = Body::Json(serde_json::to_vec(json).unwrap_or_default());
		self
	}

	pub fn with_form(mut self, parts: Vec<Part>) -> Self {
		self.body = Body::Multipart(parts);
		self
	}

	fn into_raw(self) -> (&'c HttpClient, RawRequest) {
		let mut url = format!("{}{}", self.client.base_url, self.path);
		if !self.params.is_empty() {
			let query = self
				.params
				.iter()
				.map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
				.collect::<Vec<_>>()
				.join("&");
			url.push('?');
			url.push_str(&query);
		}
		let mut headers = vec![("Accept", "application/json".to_owned())];
		if let Some(token) = self.client.token() {
			headers.push(("Authorization", format!("Bearer {token}")));
		}
		// Multipart bodies get their boundary from the transport.
		if matches!(self.body, Body::Json(_)) {
			headers.push(("Content-Type", "application/json".to_owned()));
		}
		let request = RawRequest {
			method: self.method,
			url,
			headers,
			body: self.body,
		};
		(self.client, request)
	}

	async fn fetch(self) -> Result<RawResponse, ApiError> {
		let (client, request) = self.into_raw();
		let response = client.execute(request).await?;
		if response.is_success() {
			return Ok(response);
		}
		let message = serde_json::from_slice::<ErrorBody>(&response.body)
			.ok()
			.and_then(|body| body.message)
			.filter(|message| !message.is_empty());
		log::debug!(target: "http", "rejected with {}: {message:?}", response.status);
		Err(match message {
			Some(message) => ApiError::Rejected { status: response.status, message },
			None => ApiError::Failed { status: Some(response.status) },
		})
	}

	pub async fn download(self) -> Result<Download, ApiError> {
		let response = self.fetch().await?;
		Ok(Download {
			file_name: response.header("content-disposition").and_then(disposition_file_name),
			mime: response.header("content-type").map(str::to_owned),
			bytes: response.body,
		})
	}

	pub async fn send_ignored(self) -> Result<(), ApiError> {
		self.fetch().await.map(|_| ())
	}
}

impl<'c, T> Call<'c, T>
where
	T: DeserializeOwned,
{
	pub async fn send(self) -> Result<T, ApiError> {
		let response = self.fetch().await?;
		let body: &[u8] = match response.body.iter().all(u8::is_ascii_whitespace) {
			true => b"null",
			false => &response.body,
		};
		match serde_json::from_slice(body) {
			Ok(data) => Ok(data),
			Err(err) => {
				let text = String::from_utf8_lossy(body).into_owned();
				Err(InvalidJson(text, err).into())
			}
		}
	}
}

fn disposition_file_name(header: &str) -> Option<String> {
	header.split(';').map(str::trim).find_map(|param| {
		let value = param.strip_prefix("filename=")?;
		let value = value.trim_matches('"');
		(!value.is_empty()).then(|| value.to_owned())
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::fake::{FakeBackend, BASE_URL};
	use serde_json::{json, Value};

	fn client(backend: &Rc<FakeBackend>) -> HttpClient {
		let config = Config::default().with_base_url(BASE_URL).unwrap();
		HttpClient::new(&config, backend.clone())
	}

	#[tokio::test]
	async fn bearer_token_and_json_content_type() {
		let backend = FakeBackend::new();
		let client = client(&backend);
		client.set_token(Some("abc".into()));
		let _ = client.post::<Value>("/sermons").with_json(&json!({ "title": "Grace" })).send().await;

		let request = backend.last_request().unwrap();
		assert_eq!(request.url, format!("{BASE_URL}/sermons"));
		assert_eq!(request.header("authorization"), Some("Bearer abc"));
		assert_eq!(request.header("content-type"), Some("application/json"));
	}

	#[tokio::test]
	async fn multipart_leaves_content_type_to_transport() {
		let backend = FakeBackend::new();
		let client = client(&backend);
		let parts = vec![Part::Text { name: "title".into(), value: "Notes".into() }];
		let _ = client.post::<Value>("/books").with_form(parts).send().await;

		let request = backend.last_request().unwrap();
		assert_eq!(request.header("content-type"), None);
		assert_eq!(request.header("authorization"), None);
	}

	#[tokio::test]
	async fn error_message_is_lifted_from_body() {
		let backend = FakeBackend::new();
		backend.fail_next(422, json!({ "status": "fail", "message": "Title is required" }));
		let err = client(&backend).get::<Value>("/sermons").send().await.unwrap_err();
		assert!(matches!(err, ApiError::Rejected { status: 422, ref message } if message == "Title is required"));
	}

	#[tokio::test]
	async fn unparseable_error_body_is_generic() {
		let backend = FakeBackend::new();
		backend.fail_next_raw(500, b"<html>oops</html>".to_vec());
		let err = client(&backend).get::<Value>("/sermons").send().await.unwrap_err();
		assert!(matches!(err, ApiError::Failed { status: Some(500) }));
		assert_eq!(err.user_message(), GENERIC_FAILURE);
	}

	#[tokio::test]
	async fn hung_request_times_out() {
		let backend = FakeBackend::new();
		backend.hang_next();
		let config = Config::default()
			.with_base_url(BASE_URL)
			.unwrap()
			.with_timeout(Duration::from_millis(20));
		let client = HttpClient::new(&config, backend.clone());
		let err = client.get::<Value>("/sermons").send().await.unwrap_err();
		assert!(matches!(err, ApiError::Timeout(_)));
	}

	#[tokio::test]
	async fn query_params_are_encoded() {
		let backend = FakeBackend::new();
		let _ = client(&backend)
			.get::<Value>("/prayers")
			.with_param("search", "morning & evening")
			.send()
			.await;
		let request = backend.last_request().unwrap();
		assert_eq!(request.url, format!("{BASE_URL}/prayers?search=morning%20%26%20evening"));
	}

	#[test]
	fn file_name_from_disposition() {
		assert_eq!(
			disposition_file_name("attachment; filename=\"purpose.pdf\""),
			Some("purpose.pdf".to_owned())
		);
		assert_eq!(disposition_file_name("inline"), None);
	}
}
