use super::Author;
use crate::{
	api::segment,
	form::{Editable, FieldKind, FieldSpec, FormValues},
	resource::{Downloadable, Resource},
};
use serde::Deserialize;
use time::OffsetDateTime;

pub const BOOK_CATEGORIES: &[&str] =
	&["Spiritual Growth", "Education", "Prayer", "Theology", "Biography", "Devotional", "Other"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
	#[serde(rename = "_id")]
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub author: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub number_of_downloads: u64,
	#[serde(default)]
	pub is_published: bool,
	#[serde(default)]
	pub created_by: Author,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Book {
	pub fn cover_url(&self, api_base_url: &str) -> String {
		format!("{api_base_url}{}/{}/cover", Self::PATH, segment(&self.id))
	}
}

impl Resource for Book {
	const PATH: &'static str = "/books";
	const NOUN: &'static str = "book";

	fn id(&self) -> &str {
		&self.id
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![self.title.as_str(), self.author.as_str(), self.category.as_str()]
	}
}

impl Downloadable for Book {
	fn fallback_file_name(&self) -> String {
		format!("{}.pdf", self.title)
	}

	fn downloads_mut(&mut self) -> Option<&mut u64> {
		Some(&mut self.number_of_downloads)
	}
}

impl Editable for Book {
	const FIELDS: &'static [FieldSpec] = &[
		FieldSpec::new("title", "Title", FieldKind::Text).required(),
		FieldSpec::new("author", "Author", FieldKind::Text).required(),
		FieldSpec::new("category", "Category", FieldKind::Choice(BOOK_CATEGORIES)).required(),
		FieldSpec::new("description", "Description", FieldKind::LongText),
		FieldSpec::new("coverImage", "Cover Image", FieldKind::File { accept: "image/*" }),
		FieldSpec::new("pdfFile", "PDF File", FieldKind::File { accept: "application/pdf" }).required(),
		FieldSpec::new("isPublished", "Published", FieldKind::Toggle),
	];

	fn blank() -> FormValues {
		FormValues::new().with("isPublished", "true")
	}

	fn values(&self) -> FormValues {
		FormValues::new()
			.with("title", self.title.as_str())
			.with("author", self.author.as_str())
			.with("category", self.category.as_str())
			.with("description", self.description.as_str())
			.with("isPublished", self.is_published.to_string())
	}
}
