//! In-memory stand-in for the REST backend. It records every request and
//! answers the endpoints the app uses with the same envelope shapes.

use super::{Body, HttpClient, Part, RawRequest, RawResponse, Transport, TransportError};
use crate::{
	config::Config,
	data::{Role, User},
	form::split_tags,
};
use futures::{
	channel::oneshot,
	future::{self, LocalBoxFuture},
	FutureExt,
};
use serde_json::{json, Map, Value};
use std::{
	cell::RefCell,
	collections::{BTreeMap, HashMap, VecDeque},
	rc::Rc,
};

pub const BASE_URL: &str = "http://fake.test/api";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "password1";

const CREATED_AT: &str = "2024-01-01T00:00:00Z";
const FILE_BYTES: &[u8] = b"%PDF-1.4 stored upload";
const COLLECTIONS: &[&str] = &["users", "sermons", "prayers", "books", "assignments", "materials", "zoom"];
const DOWNLOADABLE: &[&str] = &["books", "assignments", "materials"];
/// Collections the backend pages even when no `limit` is sent.
const PAGED: &[(&str, usize)] = &[("prayers", 10)];

enum Scripted {
	Respond(u16, Vec<u8>),
	Hang,
	Held(oneshot::Receiver<(u16, Value)>),
	Unreachable,
}

#[derive(Default)]
struct State {
	requests: Vec<RawRequest>,
	scripted: VecDeque<Scripted>,
	collections: BTreeMap<String, Vec<Value>>,
	submissions: Vec<Value>,
	passwords: HashMap<String, String>,
	tokens: HashMap<String, String>,
	invitations: HashMap<String, Role>,
	next_id: u64,
}

/// Cheap handle; clones share one backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
	state: Rc<RefCell<State>>,
}

impl FakeBackend {
	/// A backend with one administrator account already registered.
	pub fn new() -> Rc<Self> {
		let backend = Self::default();
		backend.seed_account("Site Admin", ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin);
		Rc::new(backend)
	}

	pub fn url(&self, path: &str) -> String {
		format!("{BASE_URL}{path}")
	}

	pub fn config(&self) -> Config {
		Config::default().with_base_url(BASE_URL).expect("fake base url is valid")
	}

	/// A client with no session.
	pub fn client(&self) -> Rc<HttpClient> {
		Rc::new(HttpClient::new(&self.config(), Rc::new(self.clone())))
	}

	/// A client already holding a token for the seeded administrator.
	pub fn signed_in_client(&self) -> Rc<HttpClient> {
		let client = self.client();
		client.set_token(self.issue_token(ADMIN_EMAIL));
		client
	}

	pub fn seed_account(&self, name: &str, email: &str, password: &str, role: Role) -> User {
		let mut state = self.state.borrow_mut();
		let user = state.insert_user(name, email, password, role, &Value::Null);
		serde_json::from_value(user).expect("seeded user decodes")
	}

	/// Registers an invitation code the backend will honor once.
	pub fn invite(&self, code: &str, role: Role) {
		self.state.borrow_mut().invitations.insert(code.to_owned(), role);
	}

	pub fn issue_token(&self, email: &str) -> Option<String> {
		let mut state = self.state.borrow_mut();
		let id = state.user_by_email(email)?.get("_id")?.as_str()?.to_owned();
		Some(state.issue_token(&id))
	}

	pub fn fail_next(&self, status: u16, body: Value) {
		self.fail_next_raw(status, body.to_string().into_bytes());
	}

	pub fn fail_next_raw(&self, status: u16, body: Vec<u8>) {
		self.state.borrow_mut().scripted.push_back(Scripted::Respond(status, body));
	}

	/// The next request never completes.
	pub fn hang_next(&self) {
		self.state.borrow_mut().scripted.push_back(Scripted::Hang);
	}

	/// The next request waits until the returned sender supplies its reply.
	pub fn hold_next(&self) -> oneshot::Sender<(u16, Value)> {
		let (release, held) = oneshot::channel();
		self.state.borrow_mut().scripted.push_back(Scripted::Held(held));
		release
	}

	/// The next request fails before reaching the server.
	pub fn drop_next(&self) {
		self.state.borrow_mut().scripted.push_back(Scripted::Unreachable);
	}

	pub fn requests(&self) -> Vec<RawRequest> {
		self.state.borrow().requests.clone()
	}

	pub fn request_count(&self) -> usize {
		self.state.borrow().requests.len()
	}

	pub fn last_request(&self) -> Option<RawRequest> {
		self.state.borrow().requests.last().cloned()
	}

	pub fn last_request_to(&self, method: &str) -> Option<RawRequest> {
		let state = self.state.borrow();
		state.requests.iter().rev().find(|request| request.method.as_str() == method).cloned()
	}

	/// Raw stored records of one collection.
	pub fn stored(&self, collection: &str) -> Vec<Value> {
		self.state.borrow().collections.get(collection).cloned().unwrap_or_default()
	}
}

impl Transport for FakeBackend {
	fn send(&self, request: RawRequest) -> LocalBoxFuture<'_, Result<RawResponse, TransportError>> {
		let mut state = self.state.borrow_mut();
		state.requests.push(request.clone());
		let response = match state.scripted.pop_front() {
			Some(Scripted::Hang) => return future::pending().boxed_local(),
			Some(Scripted::Held(held)) => {
				return async move {
					let (status, body) = held.await.map_err(|_| TransportError("held request abandoned".into()))?;
					Ok(respond(status, body))
				}
				.boxed_local()
			}
			Some(Scripted::Unreachable) => Err(TransportError("connection refused".into())),
			Some(Scripted::Respond(status, body)) => Ok(RawResponse { status, headers: json_headers(), body }),
			None => Ok(state.route(&request)),
		};
		future::ready(response).boxed_local()
	}
}

fn json_headers() -> Vec<(String, String)> {
	vec![("content-type".into(), "application/json".into())]
}

fn respond(status: u16, body: Value) -> RawResponse {
	RawResponse { status, headers: json_headers(), body: body.to_string().into_bytes() }
}

fn success(status: u16, data: Value) -> RawResponse {
	respond(status, json!({ "status": "success", "data": data }))
}

fn fail(status: u16, message: &str) -> RawResponse {
	respond(status, json!({ "status": "fail", "message": message }))
}

fn file(mime: &str) -> RawResponse {
	RawResponse {
		status: 200,
		headers: vec![("content-type".into(), mime.into())],
		body: FILE_BYTES.to_vec(),
	}
}

fn decode(raw: &str) -> String {
	urlencoding::decode(raw).map(|value| value.into_owned()).unwrap_or_else(|_| raw.to_owned())
}

fn body_value(body: &Body) -> Value {
	match body {
		Body::Empty => Value::Null,
		Body::Json(bytes) => serde_json::from_slice(bytes).unwrap_or(Value::Null),
		Body::Multipart(parts) => Value::Object(
			parts
				.iter()
				.map(|part| match part {
					Part::Text { name, value } => (name.clone(), coerce(name, value)),
					Part::File { name, attachment } => (
						name.clone(),
						json!({ "filename": attachment.file_name, "size": attachment.bytes.len() }),
					),
				})
				.collect(),
		),
	}
}

/// Multipart fields arrive as strings; the backend types them like its schema does.
fn coerce(name: &str, value: &str) -> Value {
	if name == "tags" {
		return Value::Array(split_tags(value).into_iter().map(Value::String).collect());
	}
	match value {
		"true" => Value::Bool(true),
		"false" => Value::Bool(false),
		_ => value.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::String(value.to_owned())),
	}
}

fn id_of(record: &Value) -> &str {
	record.get("_id").and_then(Value::as_str).unwrap_or_default()
}

fn author_id(record: &Value) -> &str {
	record.pointer("/createdBy/_id").and_then(Value::as_str).unwrap_or_default()
}

fn merge(target: &mut Value, patch: Value) {
	if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
		for (key, value) in patch {
			if key != "_id" {
				target.insert(key, value);
			}
		}
	}
}

fn paginate(items: Vec<Value>, query: &HashMap<String, String>) -> RawResponse {
	paginate_with(items, query, None)
}

/// `default_limit` pages a collection even when the caller asked for no page.
fn paginate_with(items: Vec<Value>, query: &HashMap<String, String>, default_limit: Option<usize>) -> RawResponse {
	let total = items.len();
	let page = query.get("page").and_then(|raw| raw.parse::<usize>().ok()).unwrap_or(1);
	let limit = query.get("limit").and_then(|raw| raw.parse::<usize>().ok()).or(default_limit);
	match limit {
		Some(limit) if limit > 0 => {
			let page = page.max(1);
			let data = items.into_iter().skip((page - 1) * limit).take(limit).collect::<Vec<_>>();
			respond(
				200,
				json!({
					"status": "success",
					"results": data.len(),
					"data": data,
					"meta": { "pagination": { "current": page, "pages": total.div_ceil(limit), "total": total } },
				}),
			)
		}
		_ => respond(200, json!({ "status": "success", "results": total, "data": items })),
	}
}

impl State {
	fn next_id(&mut self) -> String {
		self.next_id += 1;
		format!("{:024x}", self.next_id)
	}

	fn issue_token(&mut self, user_id: &str) -> String {
		let token = format!("token-{}", self.next_id());
		self.tokens.insert(token.clone(), user_id.to_owned());
		token
	}

	fn collection(&mut self, name: &str) -> &mut Vec<Value> {
		self.collections.entry(name.to_owned()).or_default()
	}

	fn users(&self) -> &[Value] {
		self.collections.get("users").map(Vec::as_slice).unwrap_or_default()
	}

	fn user_by_email(&self, email: &str) -> Option<&Value> {
		self.users().iter().find(|user| user.get("email").and_then(Value::as_str) == Some(email))
	}

	fn insert_user(&mut self, name: &str, email: &str, password: &str, role: Role, profile: &Value) -> Value {
		let id = self.next_id();
		let mut full_profile = json!({
			"phone": "", "bio": "", "dateOfBirth": null, "gender": "",
			"studentId": "", "department": "", "yearOfStudy": "",
			"church": "", "position": "", "ordinationDate": null,
		});
		merge(&mut full_profile, profile.clone());
		let user = json!({
			"_id": id,
			"name": name,
			"email": email,
			"role": role.as_str(),
			"profile": full_profile,
			"isActive": true,
			"createdAt": CREATED_AT,
		});
		self.collection("users").push(user.clone());
		self.passwords.insert(id, password.to_owned());
		user
	}

	fn caller(&self, request: &RawRequest) -> Option<Value> {
		let token = request.header("authorization")?.strip_prefix("Bearer ")?;
		let id = self.tokens.get(token)?;
		self.users().iter().find(|user| id_of(user) == id).cloned()
	}

	fn route(&mut self, request: &RawRequest) -> RawResponse {
		let Some(rest) = request.url.strip_prefix(BASE_URL) else {
			return fail(404, "Unknown host");
		};
		let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
		let segments = path.split('/').filter(|part| !part.is_empty()).map(decode).collect::<Vec<_>>();
		let segments = segments.iter().map(String::as_str).collect::<Vec<_>>();
		let query = query
			.split('&')
			.filter_map(|pair| pair.split_once('='))
			.map(|(key, value)| (decode(key), decode(value)))
			.collect::<HashMap<_, _>>();
		let body = body_value(&request.body);
		let caller = self.caller(request);

		match (request.method.as_str(), segments.as_slice()) {
			("POST", ["auth", "login"]) => self.login(&body),
			("POST", ["auth", "register"]) => self.register(&body),
			("GET", ["auth", "me"]) | ("GET", ["users", "profile"]) => match caller {
				Some(user) => success(200, json!({ "user": user })),
				None => fail(401, "Invalid token. Please log in again."),
			},
			("POST", ["auth", "change-password"]) => self.change_password(caller, &body),
			("PATCH", ["users", "profile"]) => self.update_profile(caller, body),
			("GET", ["users"]) => match caller {
				Some(user) if user["role"] == "admin" => paginate(self.users().to_vec(), &query),
				Some(_) => fail(403, "You do not have permission to perform this action"),
				None => fail(401, "You are not logged in! Please log in to get access."),
			},
			("GET", ["sermons", "author", author]) => {
				let items = self.collection("sermons").iter().filter(|item| author_id(item) == *author).cloned().collect();
				paginate(items, &query)
			}
			("GET", ["zoom", "admin", "my-meetings"]) => match caller {
				Some(user) => {
					let me = id_of(&user).to_owned();
					let items = self.collection("zoom").iter().filter(|item| author_id(item) == me).cloned().collect();
					paginate(items, &query)
				}
				None => fail(401, "You are not logged in! Please log in to get access."),
			},
			("GET", ["materials", "categories"]) => {
				let categories = self.distinct("materials", |item| item.get("category").cloned().into_iter().collect());
				success(200, json!({ "categories": categories }))
			}
			("GET", ["materials", "tags"]) => {
				let tags = self.distinct("materials", |item| {
					item.get("tags").and_then(Value::as_array).cloned().unwrap_or_default()
				});
				success(200, json!({ "tags": tags }))
			}
			("GET", ["assignments", "submissions", "my"]) => match caller {
				Some(user) => {
					let me = id_of(&user).to_owned();
					let items = self
						.submissions
						.iter()
						.filter(|item| item.pointer("/student/_id").and_then(Value::as_str) == Some(me.as_str()))
						.cloned()
						.collect();
					paginate(items, &query)
				}
				None => fail(401, "You are not logged in! Please log in to get access."),
			},
			("PATCH", ["assignments", "submissions", id, "grade"]) => self.grade(caller, id, body),
			("GET", ["assignments", "submissions", id, "download"]) => {
				match self.submissions.iter().any(|item| id_of(item) == *id) {
					true => file("application/pdf"),
					false => fail(404, "Submission not found"),
				}
			}
			("POST", ["assignments", id, "submit"]) => self.submit(caller, id, body),
			("GET", ["assignments", id, "submissions"]) => {
				let items = self
					.submissions
					.iter()
					.filter(|item| item.get("assignment").and_then(Value::as_str) == Some(*id))
					.cloned()
					.collect();
				paginate(items, &query)
			}
			("GET", ["books", id, "cover"]) => match self.find("books", id) {
				Some(_) => file("image/jpeg"),
				None => fail(404, "Book not found"),
			},
			("GET", [collection, id, "download"]) if DOWNLOADABLE.contains(collection) => {
				match self.find(collection, id) {
					Some(_) => file("application/pdf"),
					None => fail(404, "No document found with that ID"),
				}
			}
			(method, [collection, rest @ ..]) if COLLECTIONS.contains(collection) => {
				self.collection_route(method, collection, rest, caller, body, &query)
			}
			_ => fail(404, &format!("Can't find {path} on this server")),
		}
	}

	fn collection_route(
		&mut self,
		method: &str,
		collection: &str,
		rest: &[&str],
		caller: Option<Value>,
		body: Value,
		query: &HashMap<String, String>,
	) -> RawResponse {
		if method != "GET" && caller.is_none() {
			return fail(401, "You are not logged in! Please log in to get access.");
		}
		match (method, rest) {
			("GET", []) => {
				let default_limit = PAGED.iter().find(|(name, _)| *name == collection).map(|(_, limit)| *limit);
				paginate_with(self.collection(collection).clone(), query, default_limit)
			}
			("GET", [id]) => match self.find(collection, id) {
				Some(record) => success(200, record.clone()),
				None => fail(404, "No document found with that ID"),
			},
			("POST", []) => {
				let Value::Object(mut record) = body else {
					return fail(400, "Invalid request body");
				};
				let caller = caller.unwrap_or_default();
				record.insert("_id".into(), Value::String(self.next_id()));
				record.insert("createdBy".into(), json!({ "_id": caller["_id"], "name": caller["name"] }));
				record.entry("createdAt").or_insert_with(|| Value::String(CREATED_AT.into()));
				let record = Value::Object(record);
				self.collection(collection).push(record.clone());
				success(201, record)
			}
			("PATCH", [id]) => match self.collection(collection).iter_mut().find(|item| id_of(item) == *id) {
				Some(record) => {
					merge(record, body);
					success(200, record.clone())
				}
				None => fail(404, "No document found with that ID"),
			},
			("DELETE", [id]) => {
				let items = self.collection(collection);
				let before = items.len();
				items.retain(|item| id_of(item) != *id);
				match items.len() < before {
					true => respond(200, json!({ "status": "success", "data": null })),
					false => fail(404, "No document found with that ID"),
				}
			}
			_ => fail(404, "Route not found"),
		}
	}

	fn find(&self, collection: &str, id: &str) -> Option<&Value> {
		self.collections.get(collection)?.iter().find(|item| id_of(item) == id)
	}

	fn distinct(&self, collection: &str, values: impl Fn(&Value) -> Vec<Value>) -> Vec<String> {
		let mut found = self
			.collections
			.get(collection)
			.map(Vec::as_slice)
			.unwrap_or_default()
			.iter()
			.flat_map(values)
			.filter_map(|value| value.as_str().map(str::to_owned))
			.collect::<Vec<_>>();
		found.sort();
		found.dedup();
		found
	}

	fn login(&mut self, body: &Value) -> RawResponse {
		let email = body["email"].as_str().unwrap_or_default();
		let password = body["password"].as_str().unwrap_or_default();
		let Some(user) = self.user_by_email(email).cloned() else {
			return fail(401, "Incorrect email or password");
		};
		if self.passwords.get(id_of(&user)).map(String::as_str) != Some(password) {
			return fail(401, "Incorrect email or password");
		}
		if user["isActive"] == false {
			return fail(401, "Your account has been deactivated");
		}
		let token = self.issue_token(id_of(&user));
		success(200, json!({ "user": user, "token": token }))
	}

	fn register(&mut self, body: &Value) -> RawResponse {
		let name = body["name"].as_str().unwrap_or_default();
		let email = body["email"].as_str().unwrap_or_default();
		let password = body["password"].as_str().unwrap_or_default();
		if name.is_empty() || email.is_empty() || password.is_empty() {
			return fail(400, "Please provide name, email and password");
		}
		if self.user_by_email(email).is_some() {
			return fail(400, "User already exists with this email");
		}
		// the requested role is only a hint; an invitation decides elevation
		let role = match body["invitationCode"].as_str() {
			Some(code) => match self.invitations.remove(code) {
				Some(role) => role,
				None => return fail(400, "Invalid or expired invitation code"),
			},
			None => Role::Student,
		};
		let user = self.insert_user(name, email, password, role, &body["profile"]);
		let token = self.issue_token(id_of(&user));
		success(201, json!({ "user": user, "token": token }))
	}

	fn change_password(&mut self, caller: Option<Value>, body: &Value) -> RawResponse {
		let Some(user) = caller else {
			return fail(401, "You are not logged in! Please log in to get access.");
		};
		let current = body["currentPassword"].as_str().unwrap_or_default();
		let new = body["newPassword"].as_str().unwrap_or_default();
		let id = id_of(&user).to_owned();
		if self.passwords.get(&id).map(String::as_str) != Some(current) {
			return fail(401, "Your current password is wrong");
		}
		if new.len() < 6 {
			return fail(400, "Password must be at least 6 characters");
		}
		self.passwords.insert(id, new.to_owned());
		respond(200, json!({ "status": "success", "message": "Password updated successfully" }))
	}

	fn update_profile(&mut self, caller: Option<Value>, body: Value) -> RawResponse {
		let Some(user) = caller else {
			return fail(401, "You are not logged in! Please log in to get access.");
		};
		let id = id_of(&user).to_owned();
		match self.collection("users").iter_mut().find(|item| id_of(item) == id) {
			Some(record) => {
				if let Some(profile) = record.get_mut("profile") {
					merge(profile, body);
				}
				success(200, json!({ "user": record.clone() }))
			}
			None => fail(404, "User not found"),
		}
	}

	fn submit(&mut self, caller: Option<Value>, assignment: &str, body: Value) -> RawResponse {
		let Some(user) = caller else {
			return fail(401, "You are not logged in! Please log in to get access.");
		};
		if self.find("assignments", assignment).is_none() {
			return fail(404, "Assignment not found");
		}
		let Some(file) = body.get("file").cloned() else {
			return fail(400, "Please upload a file");
		};
		let mut record = Map::new();
		record.insert("_id".into(), Value::String(self.next_id()));
		record.insert("assignment".into(), Value::String(assignment.to_owned()));
		record.insert("student".into(), json!({ "_id": user["_id"], "name": user["name"] }));
		record.insert("comment".into(), body.get("comment").cloned().unwrap_or(Value::String(String::new())));
		record.insert("file".into(), file);
		record.insert("grade".into(), Value::Null);
		record.insert("feedback".into(), Value::String(String::new()));
		record.insert("submittedAt".into(), Value::String(CREATED_AT.into()));
		let record = Value::Object(record);
		self.submissions.push(record.clone());
		success(201, record)
	}

	fn grade(&mut self, caller: Option<Value>, id: &str, body: Value) -> RawResponse {
		match caller {
			Some(user) if user["role"] != "student" => {}
			Some(_) => return fail(403, "You do not have permission to perform this action"),
			None => return fail(401, "You are not logged in! Please log in to get access."),
		}
		match self.submissions.iter_mut().find(|item| id_of(item) == id) {
			Some(record) => {
				merge(record, body);
				success(200, record.clone())
			}
			None => fail(404, "Submission not found"),
		}
	}
}
