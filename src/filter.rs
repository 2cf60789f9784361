use crate::resource::Resource;

/// Case-insensitive substring match over any of `fields`. An empty query matches everything.
pub fn matches(query: &str, fields: &[&str]) -> bool {
	if query.is_empty() {
		return true;
	}
	let needle = query.to_lowercase();
	fields.iter().any(|field| field.to_lowercase().contains(&needle))
}

pub fn by_query<R: Resource>(items: &[R], query: &str) -> Vec<R> {
	items
		.iter()
		.filter(|item| matches(query, &item.search_fields()))
		.cloned()
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::Prayer;
	use serde_json::json;

	fn prayers() -> Vec<Prayer> {
		let raw = json!([
			{ "_id": "1", "title": "Prayer for Strength", "category": "Healing", "createdBy": { "_id": "u1", "name": "Eugene Choge" } },
			{ "_id": "2", "title": "Morning Devotion", "category": "Guidance", "createdBy": { "_id": "u2", "name": "Pastor Mark" } },
			{ "_id": "3", "title": "Evening Psalm", "category": "Peace", "createdBy": { "_id": "u1", "name": "Eugene Choge" } },
		]);
		serde_json::from_value(raw).unwrap()
	}

	fn ids(items: &[Prayer]) -> Vec<&str> {
		items.iter().map(|item| item.id.as_str()).collect()
	}

	#[test]
	fn empty_query_returns_everything() {
		assert_eq!(by_query(&prayers(), "").len(), 3);
	}

	#[test]
	fn match_is_case_insensitive_across_fields() {
		let items = prayers();
		assert_eq!(ids(&by_query(&items, "STRENGTH")), vec!["1"]);
		assert_eq!(ids(&by_query(&items, "guid")), vec!["2"]);
		assert_eq!(ids(&by_query(&items, "choge")), vec!["1", "3"]);
		assert_eq!(ids(&by_query(&items, "e")), vec!["1", "2", "3"]);
	}

	#[test]
	fn no_match_returns_nothing() {
		assert!(by_query(&prayers(), "zebra").is_empty());
	}
}
