use crate::validate::ValidationError;
use std::time::Duration;

pub static GENERIC_FAILURE: &str = "Something went wrong";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error("{message}")]
	Rejected { status: u16, message: String },
	#[error("request failed with status {status:?}")]
	Failed { status: Option<u16> },
	#[error(transparent)]
	InvalidJson(#[from] InvalidJson),
	#[error("network error: {0}")]
	Transport(String),
	#[error("request timed out after {0:?}")]
	Timeout(Duration),
	#[error("request cancelled")]
	Cancelled,
}

impl ApiError {
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			Self::Failed { status } => *status,
			_ => None,
		}
	}

	pub fn is_auth_rejection(&self) -> bool {
		matches!(self.status(), Some(401 | 403))
	}

	/// Text shown to the user in a notification.
	pub fn user_message(&self) -> String {
		match self {
			Self::Validation(err) => err.to_string(),
			Self::Rejected { message, .. } => message.clone(),
			Self::Timeout(_) => "The request timed out".to_owned(),
			Self::Cancelled => "The request was cancelled".to_owned(),
			Self::Failed { .. } | Self::InvalidJson(_) | Self::Transport(_) => GENERIC_FAILURE.to_owned(),
		}
	}
}

#[derive(thiserror::Error, Debug)]
pub struct InvalidJson(pub String, pub serde_json::Error);
impl std::fmt::Display for InvalidJson {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Invalid json: {:?}\nError: {:?}", self.0, self.1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn server_messages_surface_verbatim() {
		let err = ApiError::Rejected { status: 400, message: "Title is required".into() };
		assert_eq!(err.user_message(), "Title is required");
		assert!(!err.is_auth_rejection());
	}

	#[test]
	fn transport_failures_are_generic() {
		assert_eq!(ApiError::Transport("dns".into()).user_message(), GENERIC_FAILURE);
		assert_eq!(ApiError::Failed { status: Some(502) }.user_message(), GENERIC_FAILURE);
		let json_err = serde_json::from_str::<u8>("<html>").unwrap_err();
		assert_eq!(ApiError::from(InvalidJson("<html>".into(), json_err)).user_message(), GENERIC_FAILURE);
	}

	#[test]
	fn auth_rejections_cover_401_and_403() {
		assert!(ApiError::Failed { status: Some(401) }.is_auth_rejection());
		assert!(ApiError::Rejected { status: 403, message: "nope".into() }.is_auth_rejection());
		assert!(!ApiError::Timeout(Duration::from_secs(1)).is_auth_rejection());
	}
}
