use super::Author;
use crate::{
	api::HttpClient,
	form::{Editable, FieldKind, FieldSpec, FormValues},
	resource::{Controller, Resource},
	validate::{self, ValidationError},
};
use serde::Deserialize;
use std::rc::Rc;
use time::{format_description::well_known::Rfc3339, macros::format_description, Duration, OffsetDateTime, PrimitiveDateTime};

/// Meetings are treated as live for this long after they start.
pub const MEETING_LENGTH: Duration = Duration::hours(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingStatus {
	Cancelled,
	Ongoing,
	Upcoming,
	Completed,
}

impl MeetingStatus {
	pub fn label(&self) -> &'static str {
		match self {
			Self::Cancelled => "Cancelled",
			Self::Ongoing => "Live Now",
			Self::Upcoming => "Upcoming",
			Self::Completed => "Completed",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomMeeting {
	#[serde(rename = "_id")]
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub meeting_link: String,
	#[serde(default)]
	pub scheduled_date: String,
	#[serde(default = "super::default_true")]
	pub is_active: bool,
	#[serde(default)]
	pub created_by: Author,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

impl ZoomMeeting {
	/// Accepts both full RFC 3339 timestamps and the `YYYY-MM-DDTHH:MM` form
	/// a datetime input produces, the latter read as UTC.
	pub fn starts_at(&self) -> Option<OffsetDateTime> {
		let raw = self.scheduled_date.trim();
		if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
			return Some(at);
		}
		let local = format_description!("[year]-[month]-[day]T[hour]:[minute]");
		let seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
		PrimitiveDateTime::parse(raw, &local)
			.or_else(|_| PrimitiveDateTime::parse(raw, &seconds))
			.ok()
			.map(PrimitiveDateTime::assume_utc)
	}

	pub fn status_at(&self, now: OffsetDateTime) -> MeetingStatus {
		if !self.is_active {
			return MeetingStatus::Cancelled;
		}
		let Some(start) = self.starts_at() else {
			return MeetingStatus::Upcoming;
		};
		if now < start {
			MeetingStatus::Upcoming
		} else if now <= start + MEETING_LENGTH {
			MeetingStatus::Ongoing
		} else {
			MeetingStatus::Completed
		}
	}
}

impl Resource for ZoomMeeting {
	const PATH: &'static str = "/zoom";
	const NOUN: &'static str = "meeting";

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

impl Editable for ZoomMeeting {
	const FIELDS: &'static [FieldSpec] = &[
		FieldSpec::new("title", "Title", FieldKind::Text).required(),
		FieldSpec::new("description", "Description", FieldKind::LongText),
		FieldSpec::new("meetingLink", "Meeting Link", FieldKind::Text).required(),
		FieldSpec::new("scheduledDate", "Scheduled Date", FieldKind::DateTime).required(),
		FieldSpec::new("isActive", "Active", FieldKind::Toggle),
	];

	fn blank() -> FormValues {
		FormValues::new().with("isActive", "true")
	}

	fn values(&self) -> FormValues {
		// datetime inputs only take minutes
		let scheduled = self.scheduled_date.get(..16).unwrap_or(&self.scheduled_date);
		FormValues::new()
			.with("title", self.title.as_str())
			.with("description", self.description.as_str())
			.with("meetingLink", self.meeting_link.as_str())
			.with("scheduledDate", scheduled)
			.with("isActive", self.is_active.to_string())
	}

	fn check(values: &FormValues, _editing: bool) -> Result<(), ValidationError> {
		validate::meeting_link(values.get("meetingLink"))
	}
}

impl Controller<ZoomMeeting> {
	/// Meetings scheduled by the signed-in administrator.
	pub fn scheduled_by_me(client: Rc<HttpClient>) -> Self {
		Self::new(client).with_list_path(format!("{}/admin/my-meetings", ZoomMeeting::PATH))
	}
}
