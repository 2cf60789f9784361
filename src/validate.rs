//! Client-side checks that run before any request is built.

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	#[error("{0} is required")]
	Required(String),
	#[error("Please fill all required fields")]
	MissingFields(Vec<String>),
	#[error("Passwords do not match")]
	PasswordMismatch,
	#[error("Password must be at least {} characters long", MIN_PASSWORD_LEN)]
	PasswordTooShort,
	#[error("New password must be different from the current password")]
	PasswordUnchanged,
	#[error("Invalid invitation code")]
	InvalidInvitation,
	#[error("Meeting link must start with https://")]
	InsecureMeetingLink,
	#[error("Video materials require either a file upload or external link")]
	VideoSourceMissing,
	#[error("File upload is required for this material type")]
	FileRequired,
	#[error("Grade must be between 0 and {0}")]
	GradeOutOfRange(u32),
}

pub fn required(label: &str, value: &str) -> Result<(), ValidationError> {
	match value.trim().is_empty() {
		true => Err(ValidationError::Required(label.to_owned())),
		false => Ok(()),
	}
}

pub fn password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
	if password != confirmation {
		return Err(ValidationError::PasswordMismatch);
	}
	if password.chars().count() < MIN_PASSWORD_LEN {
		return Err(ValidationError::PasswordTooShort);
	}
	Ok(())
}

pub fn meeting_link(link: &str) -> Result<(), ValidationError> {
	match link.trim().starts_with("https://") {
		true => Ok(()),
		false => Err(ValidationError::InsecureMeetingLink),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn password_rules() {
		assert_eq!(password("secret1", "secret2"), Err(ValidationError::PasswordMismatch));
		assert_eq!(password("abc", "abc"), Err(ValidationError::PasswordTooShort));
		assert_eq!(password("abcdef", "abcdef"), Ok(()));
	}

	#[test]
	fn blank_values_are_missing() {
		assert_eq!(required("Name", "   "), Err(ValidationError::Required("Name".into())));
		assert_eq!(required("Name", "Grace"), Ok(()));
	}

	#[test]
	fn meeting_links_need_https() {
		assert_eq!(meeting_link("http://zoom.us/j/1"), Err(ValidationError::InsecureMeetingLink));
		assert_eq!(meeting_link("https://zoom.us/j/1"), Ok(()));
	}
}
