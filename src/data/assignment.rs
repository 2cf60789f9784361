use super::{Author, FileRef};
use crate::{
	api::{segment, ApiError, Attachment, Download, Envelope, Part},
	form::{Editable, FieldKind, FieldSpec, FormValues},
	resource::{Controller, Downloadable, Resource},
	validate::ValidationError,
};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
	#[serde(rename = "_id")]
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub due_date: Option<String>,
	#[serde(default)]
	pub points: u32,
	#[serde(default)]
	pub file: Option<FileRef>,
	#[serde(default)]
	pub number_of_submissions: u64,
	#[serde(default)]
	pub number_of_downloads: u64,
	#[serde(default = "super::default_true")]
	pub is_active: bool,
	#[serde(default)]
	pub created_by: Author,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl Resource for Assignment {
	const PATH: &'static str = "/assignments";
	const NOUN: &'static str = "assignment";

	fn id(&self) -> &str {
		&self.id
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![self.title.as_str(), self.description.as_str(), self.created_by.name.as_str()]
	}
}

impl Downloadable for Assignment {
	fn fallback_file_name(&self) -> String {
		match &self.file {
			Some(file) if !file.filename.is_empty() => file.filename.clone(),
			_ => format!("{}.pdf", self.title),
		}
	}

	fn downloads_mut(&mut self) -> Option<&mut u64> {
		Some(&mut self.number_of_downloads)
	}
}

impl Editable for Assignment {
	const FIELDS: &'static [FieldSpec] = &[
		FieldSpec::new("title", "Title", FieldKind::Text).required(),
		FieldSpec::new("description", "Description", FieldKind::LongText).required(),
		FieldSpec::new("dueDate", "Due Date", FieldKind::Date).required(),
		FieldSpec::new("points", "Points", FieldKind::Number).required(),
		FieldSpec::new("file", "Assignment Brief", FieldKind::File { accept: ".pdf,.doc,.docx" }),
		FieldSpec::new("isActive", "Open for submissions", FieldKind::Toggle),
	];

	fn blank() -> FormValues {
		FormValues::new().with("points", "100").with("isActive", "true")
	}

	fn values(&self) -> FormValues {
		FormValues::new()
			.with("title", self.title.as_str())
			.with("description", self.description.as_str())
			.with("dueDate", self.due_date.clone().unwrap_or_default())
			.with("points", self.points.to_string())
			.with("isActive", self.is_active.to_string())
	}

	fn check(values: &FormValues, _editing: bool) -> Result<(), ValidationError> {
		let raw = values.get("points").trim();
		match raw.parse::<u32>() {
			Ok(_) => Ok(()),
			Err(_) => Err(ValidationError::MissingFields(vec!["Points".to_owned()])),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
	#[serde(rename = "_id")]
	pub id: String,
	#[serde(default)]
	pub assignment: AssignmentRef,
	#[serde(default)]
	pub student: Author,
	#[serde(default)]
	pub comment: String,
	#[serde(default)]
	pub file: Option<FileRef>,
	#[serde(default)]
	pub grade: Option<u32>,
	#[serde(default)]
	pub feedback: String,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub submitted_at: Option<OffsetDateTime>,
}

/// The backend either populates the assignment or sends its bare id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AssignmentRef {
	Id(String),
	Populated {
		#[serde(rename = "_id")]
		id: String,
		#[serde(default)]
		title: String,
		#[serde(default)]
		points: u32,
	},
}

impl Default for AssignmentRef {
	fn default() -> Self {
		Self::Id(String::new())
	}
}

impl AssignmentRef {
	pub fn id(&self) -> &str {
		match self {
			Self::Id(id) | Self::Populated { id, .. } => id,
		}
	}

	pub fn title(&self) -> Option<&str> {
		match self {
			Self::Id(_) => None,
			Self::Populated { title, .. } => Some(title),
		}
	}
}

impl Submission {
	pub fn is_graded(&self) -> bool {
		self.grade.is_some()
	}
}

impl Resource for Submission {
	const PATH: &'static str = "/assignments/submissions";
	const NOUN: &'static str = "submission";

	fn id(&self) -> &str {
		&self.id
	}

	fn title(&self) -> &str {
		self.assignment.title().unwrap_or(&self.student.name)
	}

	fn search_fields(&self) -> Vec<&str> {
		let mut fields = vec![self.student.name.as_str(), self.comment.as_str()];
		fields.extend(self.assignment.title());
		fields
	}
}

impl Downloadable for Submission {
	fn fallback_file_name(&self) -> String {
		match &self.file {
			Some(file) if !file.filename.is_empty() => file.filename.clone(),
			_ => format!("submission-{}", self.id),
		}
	}
}

impl Controller<Assignment> {
	/// Hands in work for one assignment. The local submission count is bumped on success.
	pub async fn submit(&self, id: &str, file: Attachment, comment: &str) -> Result<Submission, ApiError> {
		let mut parts = vec![Part::File { name: "file".into(), attachment: file }];
		if !comment.trim().is_empty() {
			parts.push(Part::Text { name: "comment".into(), value: comment.trim().to_owned() });
		}
		let call = self
			.client()
			.post::<Envelope<Submission>>(format!("{}/submit", self.item_path(id)))
			.with_form(parts);
		let submission = self.scope().run(call.send()).await?.data;
		log::info!(target: "resource", "submitted work for assignment {id}");
		self.modify(id, |assignment| assignment.number_of_submissions += 1);
		Ok(submission)
	}
}

impl Controller<Submission> {
	/// The signed-in student's own submissions.
	pub fn mine(client: std::rc::Rc<crate::api::HttpClient>) -> Self {
		Self::new(client).with_list_path(format!("{}/my", Submission::PATH))
	}

	/// Every submission handed in for one assignment.
	pub fn for_assignment(client: std::rc::Rc<crate::api::HttpClient>, assignment_id: &str) -> Self {
		Self::new(client).with_list_path(format!("{}/{}/submissions", Assignment::PATH, segment(assignment_id)))
	}

	pub async fn grade(&self, id: &str, grade: u32, max_points: u32, feedback: &str) -> Result<Submission, ApiError> {
		if grade > max_points {
			return Err(ValidationError::GradeOutOfRange(max_points).into());
		}
		let call = self
			.client()
			.patch::<Envelope<Submission>>(format!("{}/grade", self.item_path(id)))
			.with_json(&json!({ "grade": grade, "feedback": feedback.trim() }));
		let submission = self.scope().run(call.send()).await?.data;
		log::info!(target: "resource", "graded submission {id}");
		self.upsert(submission.clone());
		Ok(submission)
	}

	pub async fn download_submission(&self, id: &str) -> Result<Download, ApiError> {
		self.download(id).await
	}
}
