use crate::api::ApiError;
use futures::future::{AbortHandle, Abortable};
use std::{cell::{Cell, RefCell}, future::Future};

/// Owns the in-flight requests of one view so they can be dropped together
/// when the view goes away.
#[derive(Debug, Default)]
pub struct TaskScope {
	next_id: Cell<usize>,
	handles: RefCell<Vec<(usize, AbortHandle)>>,
	closed: Cell<bool>,
}

impl TaskScope {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_closed(&self) -> bool {
		self.closed.get()
	}

	pub fn in_flight(&self) -> usize {
		self.handles.borrow().len()
	}

	pub async fn run<F, T>(&self, future: F) -> Result<T, ApiError>
	where
		F: Future<Output = Result<T, ApiError>>,
	{
		if self.closed.get() {
			return Err(ApiError::Cancelled);
		}
		let id = self.next_id.get();
		self.next_id.set(id.wrapping_add(1));
		let (handle, registration) = AbortHandle::new_pair();
		self.handles.borrow_mut().push((id, handle));
		let result = Abortable::new(future, registration).await;
		self.handles.borrow_mut().retain(|(other, _)| *other != id);
		match result {
			Ok(output) => output,
			Err(_aborted) => Err(ApiError::Cancelled),
		}
	}

	/// Aborts everything in flight; later runs resolve to `Cancelled` immediately.
	pub fn close(&self) {
		self.closed.set(true);
		let handles = std::mem::take(&mut *self.handles.borrow_mut());
		if !handles.is_empty() {
			log::debug!(target: "resource", "aborting {} in-flight request(s)", handles.len());
		}
		for (_, handle) in handles {
			handle.abort();
		}
	}
}

impl Drop for TaskScope {
	fn drop(&mut self) {
		self.close();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn close_aborts_pending_work() {
		let scope = TaskScope::new();
		let pending = scope.run(futures::future::pending::<Result<(), ApiError>>());
		let (result, _) = futures::join!(pending, async { scope.close() });
		assert!(matches!(result, Err(ApiError::Cancelled)));
		assert_eq!(scope.in_flight(), 0);
	}

	#[tokio::test]
	async fn closed_scope_refuses_new_work() {
		let scope = TaskScope::new();
		scope.close();
		let result = scope.run(async { Ok(1) }).await;
		assert!(matches!(result, Err(ApiError::Cancelled)));
	}

	#[tokio::test]
	async fn completed_work_is_released() {
		let scope = TaskScope::new();
		assert_eq!(scope.run(async { Ok(7) }).await.unwrap(), 7);
		assert_eq!(scope.in_flight(), 0);
	}
}
