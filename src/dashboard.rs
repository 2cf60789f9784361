//! Aggregate counts for the administrator's overview.

use crate::{
	api::HttpClient,
	data::{Assignment, Book, LearningMaterial, Prayer, Sermon, User, ZoomMeeting},
	resource::{Controller, Resource},
};
use std::rc::Rc;

/// Collection sizes; `None` when that collection could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overview {
	pub users: Option<usize>,
	pub sermons: Option<usize>,
	pub prayers: Option<usize>,
	pub books: Option<usize>,
	pub assignments: Option<usize>,
	pub materials: Option<usize>,
	pub meetings: Option<usize>,
}

async fn count<R: Resource>(client: Rc<HttpClient>) -> Option<usize> {
	match Controller::<R>::new(client).fetch_all().await {
		Ok(count) => Some(count),
		Err(err) => {
			log::warn!(target: "resource", "could not count {}: {err}", R::PATH);
			None
		}
	}
}

impl Overview {
	/// Issues all seven reads at once and waits for every one of them.
	pub async fn load(client: Rc<HttpClient>) -> Self {
		let (users, sermons, prayers, books, assignments, materials, meetings) = futures::join!(
			count::<User>(client.clone()),
			count::<Sermon>(client.clone()),
			count::<Prayer>(client.clone()),
			count::<Book>(client.clone()),
			count::<Assignment>(client.clone()),
			count::<LearningMaterial>(client.clone()),
			count::<ZoomMeeting>(client),
		);
		Self { users, sermons, prayers, books, assignments, materials, meetings }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{api::fake::FakeBackend, resource::Payload};
	use serde_json::json;

	#[tokio::test]
	async fn one_failure_does_not_sink_the_rest() {
		let backend = FakeBackend::new();
		let client = backend.signed_in_client();
		let books = Controller::<Book>::new(client.clone());
		books.create(Payload::Json(json!({ "title": "Divine Purpose", "author": "E. Choge" }))).await.unwrap();

		let before = backend.request_count();
		backend.fail_next(500, json!({ "message": "database offline" }));
		let overview = Overview::load(client).await;
		assert_eq!(backend.request_count(), before + 7);
		assert_eq!(overview.users, None);
		assert_eq!(overview.books, Some(1));
		assert_eq!(overview.sermons, Some(0));
		assert_eq!(overview.meetings, Some(0));
	}

	#[tokio::test]
	async fn paged_collections_report_their_total() {
		let backend = FakeBackend::new();
		let client = backend.signed_in_client();
		let prayers = Controller::<Prayer>::new(client.clone());
		for n in 0..11 {
			let body = json!({ "title": format!("Vigil {n}"), "category": "Peace", "content": "Amen" });
			prayers.create(Payload::Json(body)).await.unwrap();
		}
		let overview = Overview::load(client).await;
		assert_eq!(overview.prayers, Some(11));
	}
}
