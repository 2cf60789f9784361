use super::{Author, FileRef};
use crate::{
	api::{ApiError, Envelope},
	form::{Editable, FieldKind, FieldSpec, FormValues},
	resource::{Controller, Downloadable, Resource},
	validate::ValidationError,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const MATERIAL_CATEGORIES: &[&str] = &[
	"Bible Studies",
	"Theology",
	"Church History",
	"Pastoral Care",
	"Worship",
	"Leadership",
	"Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
	#[default]
	Pdf,
	Video,
	Note,
	Image,
}

impl MaterialKind {
	pub const ALL: [MaterialKind; 4] = [Self::Pdf, Self::Video, Self::Note, Self::Image];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pdf => "pdf",
			Self::Video => "video",
			Self::Note => "note",
			Self::Image => "image",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == value)
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningMaterial {
	#[serde(rename = "_id")]
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub category: String,
	#[serde(rename = "type", default)]
	pub kind: MaterialKind,
	#[serde(default)]
	pub file_url: Option<FileRef>,
	#[serde(default)]
	pub external_link: Option<String>,
	#[serde(default)]
	pub thumbnail_url: Option<FileRef>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub number_of_downloads: u64,
	#[serde(default)]
	pub number_of_views: u64,
	#[serde(default)]
	pub is_published: bool,
	#[serde(default)]
	pub created_by: Author,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}

impl LearningMaterial {
	pub fn has_file(&self) -> bool {
		self.file_url.is_some()
	}
}

impl Resource for LearningMaterial {
	const PATH: &'static str = "/materials";
	const NOUN: &'static str = "material";

	fn id(&self) -> &str {
		&self.id
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn search_fields(&self) -> Vec<&str> {
		let mut fields = vec![self.title.as_str(), self.description.as_str(), self.category.as_str()];
		fields.extend(self.tags.iter().map(String::as_str));
		fields
	}
}

impl Downloadable for LearningMaterial {
	fn fallback_file_name(&self) -> String {
		match &self.file_url {
			Some(file) if !file.filename.is_empty() => file.filename.clone(),
			_ => self.title.clone(),
		}
	}

	fn downloads_mut(&mut self) -> Option<&mut u64> {
		Some(&mut self.number_of_downloads)
	}
}

impl Editable for LearningMaterial {
	const FIELDS: &'static [FieldSpec] = &[
		FieldSpec::new("title", "Title", FieldKind::Text).required(),
		FieldSpec::new("description", "Description", FieldKind::LongText).required(),
		FieldSpec::new("category", "Category", FieldKind::Choice(MATERIAL_CATEGORIES)).required(),
		FieldSpec::new("type", "Type", FieldKind::Choice(&["pdf", "video", "note", "image"])).required(),
		FieldSpec::new("externalLink", "External Link", FieldKind::Text),
		FieldSpec::new("tags", "Tags (comma separated)", FieldKind::Text),
		FieldSpec::new("fileUrl", "File", FieldKind::File { accept: "" }),
		FieldSpec::new("thumbnailUrl", "Thumbnail", FieldKind::File { accept: "image/*" }),
		FieldSpec::new("isPublished", "Published", FieldKind::Toggle),
	];

	fn blank() -> FormValues {
		FormValues::new()
			.with("category", "Bible Studies")
			.with("type", MaterialKind::Pdf.as_str())
			.with("isPublished", "true")
	}

	fn values(&self) -> FormValues {
		FormValues::new()
			.with("title", self.title.as_str())
			.with("description", self.description.as_str())
			.with("category", self.category.as_str())
			.with("type", self.kind.as_str())
			.with("externalLink", self.external_link.clone().unwrap_or_default())
			.with("tags", self.tags.join(", "))
			.with("isPublished", self.is_published.to_string())
	}

	fn check(values: &FormValues, editing: bool) -> Result<(), ValidationError> {
		let has_file = values.attachment("fileUrl").is_some();
		match MaterialKind::parse(values.get("type")) {
			Some(MaterialKind::Video) => {
				let has_link = !values.get("externalLink").trim().is_empty();
				if !has_file && !has_link && !editing {
					return Err(ValidationError::VideoSourceMissing);
				}
			}
			Some(_) if !has_file && !editing => return Err(ValidationError::FileRequired),
			Some(_) => {}
			None => return Err(ValidationError::Required("Type".to_owned())),
		}
		Ok(())
	}
}

#[derive(Deserialize)]
struct Categories {
	#[serde(default)]
	categories: Vec<String>,
}

#[derive(Deserialize)]
struct Tags {
	#[serde(default)]
	tags: Vec<String>,
}

impl Controller<LearningMaterial> {
	/// Categories in use across all materials.
	pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
		let call = self.client().get::<Envelope<Categories>>(format!("{}/categories", LearningMaterial::PATH));
		Ok(self.scope().run(call.send()).await?.data.categories)
	}

	pub async fn tags(&self) -> Result<Vec<String>, ApiError> {
		let call = self.client().get::<Envelope<Tags>>(format!("{}/tags", LearningMaterial::PATH));
		Ok(self.scope().run(call.send()).await?.data.tags)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{api::{fake::FakeBackend, Attachment}, form::prepare, resource::Payload};

	fn video() -> FormValues {
		FormValues::new()
			.with("title", "Psalms in Worship")
			.with("description", "Lecture recording")
			.with("category", "Worship")
			.with("type", "video")
	}

	#[test]
	fn video_needs_a_file_or_link() {
		assert_eq!(prepare::<LearningMaterial>(&video(), false), Err(ValidationError::VideoSourceMissing));
		let linked = video().with("externalLink", "https://youtu.be/abc");
		assert!(matches!(prepare::<LearningMaterial>(&linked, false), Ok(Payload::Json(_))));
	}

	#[test]
	fn documents_need_a_file_when_created() {
		let pdf = video().with("type", "pdf");
		assert_eq!(prepare::<LearningMaterial>(&pdf, false), Err(ValidationError::FileRequired));
		assert!(prepare::<LearningMaterial>(&pdf, true).is_ok());

		let mut attached = pdf.clone();
		attached.attach(
			"fileUrl",
			Attachment { file_name: "romans.pdf".into(), mime: "application/pdf".into(), bytes: vec![1] },
		);
		assert!(matches!(prepare::<LearningMaterial>(&attached, false), Ok(Payload::Multipart(_))));
	}

	#[tokio::test]
	async fn categories_and_tags_are_listed() {
		let backend = FakeBackend::new();
		let materials = Controller::<LearningMaterial>::new(backend.signed_in_client());
		let mut values = video().with("externalLink", "https://youtu.be/abc").with("tags", "psalms, worship");
		values.set("isPublished", "true");
		let payload = prepare::<LearningMaterial>(&values, false).unwrap();
		let created = materials.create(payload).await.unwrap();
		assert_eq!(created.kind, MaterialKind::Video);
		assert_eq!(materials.categories().await.unwrap(), vec!["Worship".to_owned()]);
		assert_eq!(materials.tags().await.unwrap(), vec!["psalms".to_owned(), "worship".to_owned()]);
	}
}
