use super::Author;
use crate::{
	api::{segment, HttpClient},
	form::{Editable, FieldKind, FieldSpec, FormValues},
	resource::{Controller, Resource},
};
use serde::Deserialize;
use std::rc::Rc;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sermon {
	#[serde(rename = "_id")]
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub scripture: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub date: Option<String>,
	#[serde(default)]
	pub audio_url: Option<String>,
	#[serde(default)]
	pub video_url: Option<String>,
	#[serde(default)]
	pub views: u64,
	#[serde(default)]
	pub is_published: bool,
	#[serde(default)]
	pub created_by: Author,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Resource for Sermon {
	const PATH: &'static str = "/sermons";
	const NOUN: &'static str = "sermon";

	fn id(&self) -> &str {
		&self.id
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn search_fields(&self) -> Vec<&str> {
		let mut fields = vec![self.title.as_str(), self.scripture.as_str(), self.category.as_str(), self.created_by.name.as_str()];
		fields.extend(self.tags.iter().map(String::as_str));
		fields
	}
}

impl Editable for Sermon {
	const FIELDS: &'static [FieldSpec] = &[
		FieldSpec::new("title", "Title", FieldKind::Text).required(),
		FieldSpec::new("scripture", "Scripture Reference", FieldKind::Text),
		FieldSpec::new("date", "Date", FieldKind::Date),
		FieldSpec::new("category", "Category", FieldKind::Text),
		FieldSpec::new("description", "Description", FieldKind::LongText).required(),
		FieldSpec::new("content", "Content", FieldKind::LongText),
		FieldSpec::new("tags", "Tags (comma separated)", FieldKind::Text),
		FieldSpec::new("videoUrl", "Video Link", FieldKind::Text),
		FieldSpec::new("audio", "Audio Recording", FieldKind::File { accept: "audio/*" }),
		FieldSpec::new("isPublished", "Published", FieldKind::Toggle),
	];

	fn values(&self) -> FormValues {
		FormValues::new()
			.with("title", self.title.as_str())
			.with("scripture", self.scripture.as_str())
			.with("date", self.date.clone().unwrap_or_default())
			.with("category", self.category.as_str())
			.with("description", self.description.as_str())
			.with("content", self.content.as_str())
			.with("tags", self.tags.join(", "))
			.with("videoUrl", self.video_url.clone().unwrap_or_default())
			.with("isPublished", self.is_published.to_string())
	}
}

impl Controller<Sermon> {
	/// Sermons written by one author, as listed on a clergy dashboard.
	pub fn by_author(client: Rc<HttpClient>, author_id: &str) -> Self {
		Self::new(client).with_list_path(format!("{}/author/{}", Sermon::PATH, segment(author_id)))
	}
}
