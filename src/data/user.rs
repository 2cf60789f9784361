use crate::{
	form::{Editable, FieldKind, FieldSpec, FormValues},
	resource::Resource,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	#[default]
	Student,
	Clergy,
	Admin,
}

impl Role {
	pub const ALL: [Role; 3] = [Role::Student, Role::Clergy, Role::Admin];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Student => "student",
			Self::Clergy => "clergy",
			Self::Admin => "admin",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|role| role.as_str() == value)
	}
}

impl std::fmt::Display for Role {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
	pub phone: String,
	pub bio: String,
	pub date_of_birth: Option<String>,
	pub gender: String,
	pub student_id: String,
	pub department: String,
	pub year_of_study: String,
	pub church: String,
	pub position: String,
	pub ordination_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	#[serde(rename = "_id")]
	pub id: String,
	pub name: String,
	pub email: String,
	#[serde(default)]
	pub role: Role,
	#[serde(default)]
	pub profile: Profile,
	#[serde(default = "super::default_true")]
	pub is_active: bool,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

/// Fields of `PATCH /users/profile`; unset fields are left alone by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bio: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub date_of_birth: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gender: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub student_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub department: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub year_of_study: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub church: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub position: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ordination_date: Option<String>,
}

impl Resource for User {
	const PATH: &'static str = "/users";
	const NOUN: &'static str = "user";

	fn id(&self) -> &str {
		&self.id
	}

	fn title(&self) -> &str {
		&self.name
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![self.name.as_str(), self.email.as_str(), self.role.as_str()]
	}
}

impl Editable for User {
	const FIELDS: &'static [FieldSpec] = &[
		FieldSpec::new("name", "Full Name", FieldKind::Text).required(),
		FieldSpec::new("email", "Email", FieldKind::Email).required(),
		FieldSpec::new("role", "Role", FieldKind::Choice(&["student", "clergy", "admin"])).required(),
		FieldSpec::new("isActive", "Active", FieldKind::Toggle),
	];

	fn blank() -> FormValues {
		FormValues::new().with("role", Role::Student.as_str()).with("isActive", "true")
	}

	fn values(&self) -> FormValues {
		FormValues::new()
			.with("name", self.name.as_str())
			.with("email", self.email.as_str())
			.with("role", self.role.as_str())
			.with("isActive", self.is_active.to_string())
	}
}
