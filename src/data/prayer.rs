use super::Author;
use crate::{
	form::{Editable, FieldKind, FieldSpec, FormValues},
	resource::Resource,
};
use serde::Deserialize;
use time::OffsetDateTime;

pub const PRAYER_CATEGORIES: &[&str] =
	&["Healing", "Guidance", "Peace", "Thanksgiving", "Protection", "Wisdom", "Strength", "Other"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prayer {
	#[serde(rename = "_id")]
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub is_published: bool,
	#[serde(default)]
	pub created_by: Author,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Resource for Prayer {
	const PATH: &'static str = "/prayers";
	const NOUN: &'static str = "prayer";

	fn id(&self) -> &str {
		&self.id
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![self.title.as_str(), self.category.as_str(), self.created_by.name.as_str()]
	}
}

impl Editable for Prayer {
	const FIELDS: &'static [FieldSpec] = &[
		FieldSpec::new("title", "Title", FieldKind::Text).required(),
		FieldSpec::new("category", "Category", FieldKind::Choice(PRAYER_CATEGORIES)).required(),
		FieldSpec::new("content", "Prayer", FieldKind::LongText).required(),
		FieldSpec::new("isPublished", "Published", FieldKind::Toggle),
	];

	fn blank() -> FormValues {
		FormValues::new().with("isPublished", "true")
	}

	fn values(&self) -> FormValues {
		FormValues::new()
			.with("title", self.title.as_str())
			.with("category", self.category.as_str())
			.with("content", self.content.as_str())
			.with("isPublished", self.is_published.to_string())
	}
}
