use serde::{Deserialize, Serialize};

mod assignment;
pub use assignment::*;
mod book;
pub use book::*;
mod material;
pub use material::*;
mod meeting;
pub use meeting::*;
mod prayer;
pub use prayer::*;
mod sermon;
pub use sermon::*;
mod user;
pub use user::*;

/// The user a record was created by. Listings embed the user; some write
/// replies carry only the id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "AuthorRef")]
pub struct Author {
	#[serde(rename = "_id", default)]
	pub id: String,
	#[serde(default)]
	pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorRef {
	Id(String),
	Populated {
		#[serde(rename = "_id", default)]
		id: String,
		#[serde(default)]
		name: String,
	},
}

impl From<AuthorRef> for Author {
	fn from(raw: AuthorRef) -> Self {
		match raw {
			AuthorRef::Id(id) => Self { id, name: String::new() },
			AuthorRef::Populated { id, name } => Self { id, name },
		}
	}
}

/// Metadata of a stored upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileRef {
	#[serde(default)]
	pub filename: String,
	#[serde(default)]
	pub size: u64,
}

pub(crate) fn default_true() -> bool {
	true
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn author_may_be_a_bare_id() {
		let sermon: Sermon = serde_json::from_value(json!({
			"_id": "s1",
			"title": "Walking by Faith",
			"createdBy": "u1",
		}))
		.unwrap();
		assert_eq!(sermon.created_by, Author { id: "u1".into(), name: String::new() });

		let prayer: Prayer = serde_json::from_value(json!({
			"_id": "p1",
			"title": "Morning Prayer",
			"createdBy": { "_id": "u2", "name": "Eugene Choge" },
		}))
		.unwrap();
		assert_eq!(prayer.created_by.name, "Eugene Choge");
	}
}
