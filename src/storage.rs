use gloo_storage::{LocalStorage, Storage};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

pub mod drafts;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StorageError {
	#[error("storage is unavailable: {0}")]
	Unavailable(String),
	#[error("failed to encode {0}: {1}")]
	Encode(String, String),
}

/// Durable string storage keyed by name.
pub trait Backend {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
	fn delete(&self, key: &str);
}

/// The browser's `localStorage`. Values are stored raw so plain strings written
/// by other code stay readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl Backend for LocalBackend {
	fn get(&self, key: &str) -> Option<String> {
		LocalStorage::raw().get_item(key).ok().flatten()
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		LocalStorage::raw()
			.set_item(key, value)
			.map_err(|err| StorageError::Unavailable(format!("{err:?}")))
	}

	fn delete(&self, key: &str) {
		LocalStorage::delete(key);
	}
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend(Rc<RefCell<HashMap<String, String>>>);

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.0.borrow().contains_key(key)
	}
}

impl Backend for MemoryBackend {
	fn get(&self, key: &str) -> Option<String> {
		self.0.borrow().get(key).cloned()
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.0.borrow_mut().insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn delete(&self, key: &str) {
		self.0.borrow_mut().remove(key);
	}
}

/// Where the session token survives reloads.
#[derive(Clone)]
pub struct TokenSlot {
	backend: Rc<dyn Backend>,
	key: String,
}

impl std::fmt::Debug for TokenSlot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenSlot").field("key", &self.key).finish()
	}
}

impl TokenSlot {
	pub fn new(backend: Rc<dyn Backend>, key: impl Into<String>) -> Self {
		Self { backend, key: key.into() }
	}

	pub fn load(&self) -> Option<String> {
		self.backend.get(&self.key).filter(|token| !token.trim().is_empty())
	}

	pub fn save(&self, token: &str) -> Result<(), StorageError> {
		self.backend.set(&self.key, token)
	}

	pub fn clear(&self) {
		self.backend.delete(&self.key);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_slot_round_trip() {
		let backend = MemoryBackend::new();
		let slot = TokenSlot::new(Rc::new(backend.clone()), "authToken");
		assert_eq!(slot.load(), None);
		slot.save("abc").unwrap();
		assert_eq!(slot.load().as_deref(), Some("abc"));
		slot.clear();
		assert!(!backend.contains("authToken"));
	}

	#[test]
	fn blank_token_counts_as_absent() {
		let backend = MemoryBackend::new();
		backend.set("authToken", "").unwrap();
		let slot = TokenSlot::new(Rc::new(backend), "authToken");
		assert_eq!(slot.load(), None);
	}
}
