//! Client-side cache of one backend collection, with every mutation routed through it.

use crate::{
	api::{segment, ApiError, Call, Download, Envelope, HttpClient, Pagination, Part},
	filter,
	task::TaskScope,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};

pub trait Resource: Clone + PartialEq + DeserializeOwned + 'static {
	/// Collection endpoint, relative to the api base.
	const PATH: &'static str;
	/// Singular noun used in messages.
	const NOUN: &'static str;

	fn id(&self) -> &str;
	fn title(&self) -> &str;
	fn search_fields(&self) -> Vec<&str>;
}

/// A record with a file behind `<path>/<id>/download`.
pub trait Downloadable: Resource {
	fn fallback_file_name(&self) -> String;

	/// Local download counter, if the record keeps one.
	fn downloads_mut(&mut self) -> Option<&mut u64> {
		None
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	Json(Value),
	Multipart(Vec<Part>),
}

impl Payload {
	fn apply<'c, T>(self, call: Call<'c, T>) -> Call<'c, T> {
		match self {
			Self::Json(body) => call.with_json(&body),
			Self::Multipart(parts) => call.with_form(parts),
		}
	}
}

/// Asked before anything destructive is sent.
pub trait Confirm {
	fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
	F: Fn(&str) -> bool,
{
	fn confirm(&self, prompt: &str) -> bool {
		self(prompt)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
	Removed,
	Declined,
}

/// How the cache catches up after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Refresh {
	/// Reload the whole collection; the response record is patched in only if that reload fails.
	#[default]
	Refetch,
	/// Patch the cache from the mutation response alone.
	Patch,
}

enum Change<R> {
	Created(R),
	Updated(R),
	Removed(String),
}

pub struct Controller<R> {
	client: Rc<HttpClient>,
	list_path: String,
	refresh: Refresh,
	items: RefCell<Vec<R>>,
	pagination: Cell<Option<Pagination>>,
	scope: TaskScope,
}

impl<R: Resource> std::fmt::Debug for Controller<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Controller")
			.field("path", &R::PATH)
			.field("list_path", &self.list_path)
			.field("refresh", &self.refresh)
			.field("cached", &self.items.borrow().len())
			.finish()
	}
}

impl<R: Resource> Controller<R> {
	pub fn new(client: Rc<HttpClient>) -> Self {
		Self {
			client,
			list_path: R::PATH.to_owned(),
			refresh: Refresh::default(),
			items: RefCell::new(Vec::new()),
			pagination: Cell::new(None),
			scope: TaskScope::new(),
		}
	}

	/// Reads the collection from somewhere other than the resource path.
	pub fn with_list_path(mut self, path: impl Into<String>) -> Self {
		self.list_path = path.into();
		self
	}

	pub fn with_refresh(mut self, refresh: Refresh) -> Self {
		self.refresh = refresh;
		self
	}

	pub fn client(&self) -> &Rc<HttpClient> {
		&self.client
	}

	pub fn scope(&self) -> &TaskScope {
		&self.scope
	}

	pub fn items(&self) -> Vec<R> {
		self.items.borrow().clone()
	}

	pub fn len(&self) -> usize {
		self.items.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.borrow().is_empty()
	}

	pub fn get(&self, id: &str) -> Option<R> {
		self.items.borrow().iter().find(|item| item.id() == id).cloned()
	}

	pub fn pagination(&self) -> Option<Pagination> {
		self.pagination.get()
	}

	pub fn filtered(&self, query: &str) -> Vec<R> {
		filter::by_query(&self.items.borrow(), query)
	}

	pub(crate) fn item_path(&self, id: &str) -> String {
		format!("{}/{}", R::PATH, segment(id))
	}

	pub fn close(&self) {
		self.scope.close();
	}

	/// Replaces the cache with whatever the server lists unasked, which may be
	/// its first page. The count is the collection total when the reply is paged.
	pub async fn fetch_all(&self) -> Result<usize, ApiError> {
		let call = self.client.get::<Envelope<Vec<R>>>(self.list_path.as_str());
		let envelope = self.scope.run(call.send()).await?;
		Ok(self.replace(envelope))
	}

	/// Replaces the cache with one page of the collection.
	pub async fn fetch_page(&self, page: u32, limit: u32) -> Result<Option<Pagination>, ApiError> {
		let call = self
			.client
			.get::<Envelope<Vec<R>>>(self.list_path.as_str())
			.with_param("page", page.max(1))
			.with_param("limit", limit.max(1));
		let envelope = self.scope.run(call.send()).await?;
		self.replace(envelope);
		Ok(self.pagination.get())
	}

	/// Reads one record and keeps the cached copy current.
	pub async fn fetch(&self, id: &str) -> Result<R, ApiError> {
		let call = self.client.get::<Envelope<R>>(self.item_path(id));
		let record = self.scope.run(call.send()).await?.data;
		self.upsert(record.clone());
		Ok(record)
	}

	fn replace(&self, envelope: Envelope<Vec<R>>) -> usize {
		let pagination = envelope.meta.and_then(|meta| meta.pagination);
		let cached = envelope.data.len();
		log::debug!(target: "resource", "{} cached {cached} record(s)", R::PATH);
		*self.items.borrow_mut() = envelope.data;
		self.pagination.set(pagination);
		match pagination {
			Some(pagination) => pagination.total as usize,
			None => cached,
		}
	}

	pub async fn create(&self, payload: Payload) -> Result<R, ApiError> {
		let call = payload.apply(self.client.post::<Envelope<R>>(R::PATH));
		let record = self.scope.run(call.send()).await?.data;
		log::info!(target: "resource", "created {} {}", R::NOUN, record.id());
		self.settle(Change::Created(record.clone())).await;
		Ok(record)
	}

	pub async fn update(&self, id: &str, payload: Payload) -> Result<R, ApiError> {
		let call = payload.apply(self.client.patch::<Envelope<R>>(self.item_path(id)));
		let record = self.scope.run(call.send()).await?.data;
		log::info!(target: "resource", "updated {} {id}", R::NOUN);
		self.settle(Change::Updated(record.clone())).await;
		Ok(record)
	}

	/// Flips a boolean field such as `isActive` or `isPublished`.
	pub async fn set_flag(&self, id: &str, field: &str, value: bool) -> Result<R, ApiError> {
		self.update(id, Payload::Json(json!({ field: value }))).await
	}

	pub async fn set_published(&self, id: &str, value: bool) -> Result<R, ApiError> {
		self.set_flag(id, "isPublished", value).await
	}

	pub async fn set_active(&self, id: &str, value: bool) -> Result<R, ApiError> {
		self.set_flag(id, "isActive", value).await
	}

	/// Deletes after `confirm` agrees; a declined prompt sends nothing.
	pub async fn remove(&self, id: &str, confirm: &dyn Confirm) -> Result<Removal, ApiError> {
		let prompt = format!("Are you sure you want to delete this {}? This action cannot be undone.", R::NOUN);
		if !confirm.confirm(&prompt) {
			return Ok(Removal::Declined);
		}
		let call = self.client.delete::<()>(self.item_path(id));
		self.scope.run(call.send_ignored()).await?;
		log::info!(target: "resource", "deleted {} {id}", R::NOUN);
		self.settle(Change::Removed(id.to_owned())).await;
		Ok(Removal::Removed)
	}

	async fn settle(&self, change: Change<R>) {
		if self.refresh == Refresh::Refetch {
			match self.fetch_all().await {
				Ok(_) => return,
				Err(ApiError::Cancelled) => return,
				Err(err) => log::warn!(target: "resource", "refetch of {} failed, patching locally: {err}", R::PATH),
			}
		}
		self.patch(change);
	}

	fn patch(&self, change: Change<R>) {
		let mut items = self.items.borrow_mut();
		match change {
			Change::Created(record) | Change::Updated(record) => {
				match items.iter_mut().find(|item| item.id() == record.id()) {
					Some(existing) => *existing = record,
					None => items.push(record),
				}
			}
			Change::Removed(id) => items.retain(|item| item.id() != id),
		}
	}

	pub(crate) fn modify(&self, id: &str, apply: impl FnOnce(&mut R)) {
		if let Some(item) = self.items.borrow_mut().iter_mut().find(|item| item.id() == id) {
			apply(item);
		}
	}

	pub(crate) fn upsert(&self, record: R) {
		self.patch(Change::Updated(record));
	}
}

impl<R: Downloadable> Controller<R> {
	/// Fetches the file and bumps the local counter. The server's own count is not read back.
	pub async fn download(&self, id: &str) -> Result<Download, ApiError> {
		let call = self.client.get::<()>(format!("{}/download", self.item_path(id)));
		let mut download = self.scope.run(call.download()).await?;
		if download.file_name.is_none() {
			download.file_name = self.get(id).map(|record| record.fallback_file_name());
		}
		self.modify(id, |record| {
			if let Some(count) = record.downloads_mut() {
				*count += 1;
			}
		});
		Ok(download)
	}
}
