use futures_util::future::LocalBoxFuture;
use reqwest::Method;

/// A fully-built request, ready to go over the wire.
#[derive(Debug, Clone)]
pub struct RawRequest {
	pub method: Method,
	pub url: String,
	pub headers: Vec<(&'static str, String)>,
	pub body: Body,
}

impl RawRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
	Empty,
	Json(Vec<u8>),
	Multipart(Vec<Part>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
	Text { name: String, value: String },
	File { name: String, attachment: Attachment },
}

impl Part {
	pub fn name(&self) -> &str {
		match self {
			Self::Text { name, .. } | Self::File { name, .. } => name,
		}
	}
}

/// A file picked by the user, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
	pub file_name: String,
	pub mime: String,
	pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
	pub status: u16,
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}

impl RawResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

#[derive(thiserror::Error, Debug, Clone)]
#[error("{0}")]
pub struct TransportError(pub String);

pub trait Transport {
	fn send(&self, request: RawRequest) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	pub fn new() -> Self {
		Self::default()
	}

	fn build(&self, request: RawRequest) -> Result<reqwest::RequestBuilder, TransportError> {
		let mut builder = self.client.request(request.method, &request.url);
		for (name, value) in request.headers {
			builder = builder.header(name, value);
		}
		builder = match request.body {
			Body::Empty => builder,
			Body::Json(bytes) => builder.body(bytes),
			Body::Multipart(parts) => {
				let mut form = reqwest::multipart::Form::new();
				for part in parts {
					form = match part {
						Part::Text { name, value } => form.text(name, value),
						Part::File { name, attachment } => {
							let file = reqwest::multipart::Part::bytes(attachment.bytes)
								.file_name(attachment.file_name)
								.mime_str(&attachment.mime)
								.map_err(|err| TransportError(err.to_string()))?;
							form.part(name, file)
						}
					};
				}
				builder.multipart(form)
			}
		};
		Ok(builder)
	}
}

impl Transport for ReqwestTransport {
	fn send(&self, request: RawRequest) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>> {
		Box::pin(async move {
			let builder = self.build(request)?;
			let response = builder.send().await.map_err(|err| TransportError(err.to_string()))?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned())))
				.collect();
			let body = response.bytes().await.map_err(|err| TransportError(err.to_string()))?;
			Ok(RawResponse { status, headers, body: body.to_vec() })
		})
	}
}
