use crate::{
	api::{Attachment, Part},
	resource::{Payload, Resource},
	validate::ValidationError,
};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
	Text,
	LongText,
	Email,
	Date,
	DateTime,
	Number,
	Toggle,
	Choice(&'static [&'static str]),
	File { accept: &'static str },
}

/// One input of a generated editor form. `name` is the wire name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
	pub name: &'static str,
	pub label: &'static str,
	pub kind: FieldKind,
	pub required: bool,
}

impl FieldSpec {
	pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
		Self { name, label, kind, required: false }
	}

	pub const fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn is_file(&self) -> bool {
		matches!(self.kind, FieldKind::File { .. })
	}
}

/// What the user has typed and picked so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
	values: BTreeMap<String, String>,
	files: BTreeMap<String, Attachment>,
}

impl FormValues {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
		self.set(name, value);
		self
	}

	pub fn set(&mut self, name: &str, value: impl Into<String>) {
		self.values.insert(name.to_owned(), value.into());
	}

	pub fn get(&self, name: &str) -> &str {
		self.values.get(name).map(String::as_str).unwrap_or_default()
	}

	pub fn flag(&self, name: &str) -> bool {
		self.get(name) == "true"
	}

	pub fn attach(&mut self, name: &str, attachment: Attachment) {
		self.files.insert(name.to_owned(), attachment);
	}

	pub fn detach(&mut self, name: &str) {
		self.files.remove(name);
	}

	pub fn attachment(&self, name: &str) -> Option<&Attachment> {
		self.files.get(name)
	}

	pub fn has_attachments(&self) -> bool {
		!self.files.is_empty()
	}

	/// Labels of required fields left blank. Files are only demanded when creating.
	pub fn missing(&self, fields: &[FieldSpec], editing: bool) -> Vec<String> {
		fields
			.iter()
			.filter(|field| field.required)
			.filter(|field| match field.kind {
				FieldKind::File { .. } => !editing && self.attachment(field.name).is_none(),
				FieldKind::Toggle => false,
				_ => self.get(field.name).trim().is_empty(),
			})
			.map(|field| field.label.to_owned())
			.collect()
	}

	pub fn to_payload(&self, fields: &[FieldSpec]) -> Payload {
		match self.has_attachments() {
			true => Payload::Multipart(self.to_parts(fields)),
			false => Payload::Json(self.to_json(fields)),
		}
	}

	fn to_parts(&self, fields: &[FieldSpec]) -> Vec<Part> {
		let mut parts = Vec::new();
		for field in fields {
			if field.is_file() {
				if let Some(attachment) = self.attachment(field.name) {
					parts.push(Part::File { name: field.name.to_owned(), attachment: attachment.clone() });
				}
				continue;
			}
			let value = match field.kind {
				FieldKind::Toggle => self.flag(field.name).to_string(),
				_ => self.get(field.name).trim().to_owned(),
			};
			if value.is_empty() && !field.required {
				continue;
			}
			parts.push(Part::Text { name: field.name.to_owned(), value });
		}
		parts
	}

	fn to_json(&self, fields: &[FieldSpec]) -> Value {
		let mut object = Map::new();
		for field in fields.iter().filter(|field| !field.is_file()) {
			let raw = self.get(field.name).trim();
			let value = match field.kind {
				FieldKind::Toggle => Value::Bool(self.flag(field.name)),
				_ if raw.is_empty() && !field.required => continue,
				FieldKind::Number => number(raw),
				_ if field.name == "tags" => Value::Array(split_tags(raw).into_iter().map(Value::String).collect()),
				_ => Value::String(raw.to_owned()),
			};
			object.insert(field.name.to_owned(), value);
		}
		Value::Object(object)
	}
}

fn number(raw: &str) -> Value {
	if let Ok(int) = raw.parse::<i64>() {
		return Value::Number(int.into());
	}
	raw.parse::<f64>()
		.ok()
		.and_then(Number::from_f64)
		.map(Value::Number)
		.unwrap_or_else(|| Value::String(raw.to_owned()))
}

pub fn split_tags(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|tag| !tag.is_empty())
		.map(str::to_owned)
		.collect()
}

/// A record type that can be created and edited through a generated form.
pub trait Editable: Resource {
	const FIELDS: &'static [FieldSpec];

	/// Initial values of the "new record" form.
	fn blank() -> FormValues {
		FormValues::new()
	}

	/// Values of the edit form for an existing record.
	fn values(&self) -> FormValues;

	/// Checks beyond required fields.
	fn check(_values: &FormValues, _editing: bool) -> Result<(), ValidationError> {
		Ok(())
	}
}

/// Validates the form and turns it into a request payload; nothing is sent on failure.
pub fn prepare<R: Editable>(values: &FormValues, editing: bool) -> Result<Payload, ValidationError> {
	let missing = values.missing(R::FIELDS, editing);
	if !missing.is_empty() {
		return Err(ValidationError::MissingFields(missing));
	}
	R::check(values, editing)?;
	Ok(values.to_payload(R::FIELDS))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	const FIELDS: &[FieldSpec] = &[
		FieldSpec::new("title", "Title", FieldKind::Text).required(),
		FieldSpec::new("points", "Points", FieldKind::Number),
		FieldSpec::new("tags", "Tags", FieldKind::Text),
		FieldSpec::new("isPublished", "Published", FieldKind::Toggle),
		FieldSpec::new("file", "File", FieldKind::File { accept: "application/pdf" }).required(),
	];

	fn pdf() -> Attachment {
		Attachment { file_name: "notes.pdf".into(), mime: "application/pdf".into(), bytes: vec![1, 2, 3] }
	}

	#[test]
	fn json_payload_is_typed() {
		let values = FormValues::new()
			.with("title", " Faith ")
			.with("points", "20")
			.with("tags", "faith, hope,, love")
			.with("isPublished", "true");
		let Payload::Json(body) = values.to_payload(FIELDS) else {
			panic!("expected json payload");
		};
		assert_eq!(
			body,
			json!({ "title": "Faith", "points": 20, "tags": ["faith", "hope", "love"], "isPublished": true })
		);
	}

	#[test]
	fn attachments_switch_to_multipart() {
		let mut values = FormValues::new().with("title", "Faith").with("tags", "a, b");
		values.attach("file", pdf());
		let Payload::Multipart(parts) = values.to_payload(FIELDS) else {
			panic!("expected multipart payload");
		};
		let names = parts.iter().map(Part::name).collect::<Vec<_>>();
		assert_eq!(names, vec!["title", "tags", "isPublished", "file"]);
		assert!(parts.contains(&Part::Text { name: "tags".into(), value: "a, b".into() }));
	}

	#[test]
	fn files_are_required_only_when_creating() {
		let values = FormValues::new().with("title", "Faith");
		assert_eq!(values.missing(FIELDS, false), vec!["File".to_owned()]);
		assert!(values.missing(FIELDS, true).is_empty());
		assert_eq!(FormValues::new().missing(FIELDS, true), vec!["Title".to_owned()]);
	}
}
