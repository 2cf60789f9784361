//! Learning-material drafts kept in the browser until they are published.
//! Only metadata is stored; the file is picked again at publish time.

use super::{Backend, StorageError};
use crate::{
	api::{ApiError, Attachment},
	data::{LearningMaterial, MaterialKind},
	form::{prepare, FormValues},
	resource::Controller,
};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, rc::Rc};

const ID_PREFIX: &str = "draft-";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialDraft {
	pub id: String,
	pub title: String,
	pub description: String,
	pub category: String,
	#[serde(rename = "type")]
	pub kind: MaterialKind,
	pub external_link: String,
	pub tags: Vec<String>,
	pub is_published: bool,
	/// Name of the file the author meant to attach, as a reminder.
	pub file_name: Option<String>,
}

impl MaterialDraft {
	pub fn to_values(&self) -> FormValues {
		FormValues::new()
			.with("title", self.title.as_str())
			.with("description", self.description.as_str())
			.with("category", self.category.as_str())
			.with("type", self.kind.as_str())
			.with("externalLink", self.external_link.as_str())
			.with("tags", self.tags.join(", "))
			.with("isPublished", self.is_published.to_string())
	}

	fn sequence(&self) -> Option<u64> {
		self.id.strip_prefix(ID_PREFIX)?.parse().ok()
	}
}

pub struct DraftStore {
	backend: Rc<dyn Backend>,
	key: String,
	drafts: RefCell<Vec<MaterialDraft>>,
}

impl std::fmt::Debug for DraftStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DraftStore")
			.field("key", &self.key)
			.field("drafts", &self.drafts.borrow().len())
			.finish()
	}
}

impl DraftStore {
	/// Reads whatever is stored under `key`. Unreadable contents are logged and dropped.
	pub fn load(backend: Rc<dyn Backend>, key: impl Into<String>) -> Self {
		let key = key.into();
		let drafts = match backend.get(&key) {
			None => Vec::new(),
			Some(raw) => match serde_json::from_str::<Vec<MaterialDraft>>(&raw) {
				Ok(drafts) => drafts,
				Err(err) => {
					log::warn!(target: "drafts", "discarding unreadable drafts under {key}: {err}");
					Vec::new()
				}
			},
		};
		log::debug!(target: "drafts", "loaded {} draft(s)", drafts.len());
		Self { backend, key, drafts: RefCell::new(drafts) }
	}

	pub fn list(&self) -> Vec<MaterialDraft> {
		self.drafts.borrow().clone()
	}

	pub fn get(&self, id: &str) -> Option<MaterialDraft> {
		self.drafts.borrow().iter().find(|draft| draft.id == id).cloned()
	}

	pub fn len(&self) -> usize {
		self.drafts.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.drafts.borrow().is_empty()
	}

	/// Stores a draft. One without an id gets the next `draft-<n>`.
	pub fn save(&self, mut draft: MaterialDraft) -> Result<MaterialDraft, StorageError> {
		let mut drafts = self.drafts.borrow().clone();
		match drafts.iter_mut().find(|existing| !draft.id.is_empty() && existing.id == draft.id) {
			Some(existing) => *existing = draft.clone(),
			None => {
				let next = drafts.iter().filter_map(MaterialDraft::sequence).max().unwrap_or(0) + 1;
				draft.id = format!("{ID_PREFIX}{next}");
				drafts.push(draft.clone());
			}
		}
		self.persist(drafts)?;
		Ok(draft)
	}

	pub fn remove(&self, id: &str) -> Result<bool, StorageError> {
		let mut drafts = self.drafts.borrow().clone();
		let before = drafts.len();
		drafts.retain(|draft| draft.id != id);
		if drafts.len() == before {
			return Ok(false);
		}
		self.persist(drafts)?;
		Ok(true)
	}

	/// Creates the material through the API. The draft is only dropped once the backend accepted it.
	pub async fn publish(
		&self,
		id: &str,
		materials: &Controller<LearningMaterial>,
		file: Option<Attachment>,
	) -> Result<LearningMaterial, ApiError> {
		let Some(draft) = self.get(id) else {
			return Err(ApiError::Failed { status: None });
		};
		let mut values = draft.to_values();
		if let Some(file) = file {
			values.attach("fileUrl", file);
		}
		let payload = prepare::<LearningMaterial>(&values, false)?;
		let material = materials.create(payload).await?;
		log::info!(target: "drafts", "published {id} as material {}", material.id);
		if let Err(err) = self.remove(id) {
			log::warn!(target: "drafts", "published {id} but could not drop it: {err}");
		}
		Ok(material)
	}

	fn persist(&self, drafts: Vec<MaterialDraft>) -> Result<(), StorageError> {
		let raw = serde_json::to_string(&drafts).map_err(|err| StorageError::Encode(self.key.clone(), err.to_string()))?;
		self.backend.set(&self.key, &raw)?;
		*self.drafts.borrow_mut() = drafts;
		Ok(())
	}
}
