//! Who is signed in. One `SessionManager` is built at startup and handed to
//! the view tree through [`Provider`]; nothing reaches it through globals.

use crate::{
	api::{ApiError, Envelope, HttpClient},
	data::{ProfilePatch, Role, User},
	route::Route,
	storage::TokenSlot,
	task::TaskScope,
	validate::{self, ValidationError},
};
use serde::Deserialize;
use serde_json::json;
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
};
use yew::prelude::*;

#[derive(Clone, PartialEq, Default)]
pub struct SessionState {
	pub token: Option<String>,
	pub user: Option<User>,
	/// False until the stored token has been checked against the backend.
	pub resolved: bool,
}

impl std::fmt::Debug for SessionState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionState")
			.field("token", &self.token.as_ref().map(|_| "<redacted>"))
			.field("user", &self.user.as_ref().map(|user| &user.email))
			.field("resolved", &self.resolved)
			.finish()
	}
}

impl SessionState {
	pub fn is_authenticated(&self) -> bool {
		self.token.is_some() && self.user.is_some()
	}

	pub fn role(&self) -> Option<Role> {
		self.user.as_ref().map(|user| user.role)
	}

	/// Whether a page restricted to `required` may be shown.
	pub fn access(&self, required: Role) -> Access {
		if !self.resolved {
			return Access::Pending;
		}
		match &self.user {
			None => Access::Login,
			Some(user) if user.role != required => Access::Home,
			Some(_) => Access::Granted,
		}
	}

	pub fn dashboard_route(&self) -> Route {
		match self.role() {
			Some(role) => Route::dashboard_for(role),
			None => Route::Home,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
	Pending,
	Granted,
	Login,
	Home,
}

#[derive(Clone, PartialEq, Default)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}

impl std::fmt::Debug for Credentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Credentials").field("email", &self.email).finish_non_exhaustive()
	}
}

#[derive(Clone, PartialEq, Default)]
pub struct Registration {
	pub name: String,
	pub email: String,
	pub password: String,
	pub confirm_password: String,
	pub phone: String,
	pub student_id: String,
	pub department: String,
	pub church: String,
	pub position: String,
	/// Issued out of band to clergy and administrators.
	pub invitation_code: String,
}

impl std::fmt::Debug for Registration {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registration")
			.field("name", &self.name)
			.field("email", &self.email)
			.field("invited", &!self.invitation_code.trim().is_empty())
			.finish_non_exhaustive()
	}
}

/// A well-formed `<role>-<token>` invitation code. Only the backend knows whether it is real.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
	pub role: Role,
	pub code: String,
}

impl Invitation {
	pub const MIN_TOKEN_LEN: usize = 8;

	pub fn parse(code: &str) -> Result<Self, ValidationError> {
		let code = code.trim();
		let (role, token) = code.split_once('-').ok_or(ValidationError::InvalidInvitation)?;
		let role = match Role::parse(role) {
			Some(role @ (Role::Clergy | Role::Admin)) => role,
			_ => return Err(ValidationError::InvalidInvitation),
		};
		let well_formed = token.len() >= Self::MIN_TOKEN_LEN
			&& token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
		if !well_formed {
			return Err(ValidationError::InvalidInvitation);
		}
		Ok(Self { role, code: code.to_owned() })
	}
}

impl Registration {
	fn invitation(&self) -> Result<Option<Invitation>, ValidationError> {
		match self.invitation_code.trim() {
			"" => Ok(None),
			code => Invitation::parse(code).map(Some),
		}
	}

	fn check(&self) -> Result<Option<Invitation>, ValidationError> {
		validate::required("Full Name", &self.name)?;
		validate::required("Email", &self.email)?;
		validate::password(&self.password, &self.confirm_password)?;
		self.invitation()
	}

	fn body(&self, invitation: Option<&Invitation>) -> serde_json::Value {
		let mut body = json!({
			"name": self.name.trim(),
			"email": self.email.trim(),
			"password": self.password,
		});
		match invitation {
			None => {
				body["role"] = json!(Role::Student);
				body["profile"] = json!({
					"phone": self.phone.trim(),
					"studentId": self.student_id.trim(),
					"department": self.department.trim(),
				});
			}
			Some(invitation) => {
				body["role"] = json!(invitation.role);
				body["invitationCode"] = json!(invitation.code);
				body["profile"] = json!({
					"phone": self.phone.trim(),
					"church": self.church.trim(),
					"position": self.position.trim(),
				});
			}
		}
		body
	}
}

#[derive(Deserialize)]
struct Granted {
	user: User,
	token: String,
}

#[derive(Deserialize)]
struct Current {
	user: User,
}

type Listener = Rc<dyn Fn(&SessionState)>;
type Listeners = RefCell<Vec<(usize, Listener)>>;

/// Unregisters its listener when dropped.
pub struct Subscription {
	listeners: Weak<Listeners>,
	id: usize,
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(listeners) = self.listeners.upgrade() {
			listeners.borrow_mut().retain(|(id, _)| *id != self.id);
		}
	}
}

pub struct SessionManager {
	client: Rc<HttpClient>,
	slot: TokenSlot,
	state: RefCell<SessionState>,
	listeners: Rc<Listeners>,
	next_listener: Cell<usize>,
	scope: TaskScope,
	/// Bumped whenever a sign-in or sign-out replaces the session.
	epoch: Cell<u64>,
}

impl std::fmt::Debug for SessionManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionManager").field("state", &*self.state.borrow()).finish()
	}
}

/// Identity; there is only ever one manager per app.
impl PartialEq for SessionManager {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self, other)
	}
}

impl SessionManager {
	pub fn new(client: Rc<HttpClient>, slot: TokenSlot) -> Self {
		Self {
			client,
			slot,
			state: RefCell::new(SessionState::default()),
			listeners: Rc::new(RefCell::new(Vec::new())),
			next_listener: Cell::new(0),
			scope: TaskScope::new(),
			epoch: Cell::new(0),
		}
	}

	pub fn client(&self) -> &Rc<HttpClient> {
		&self.client
	}

	pub fn state(&self) -> SessionState {
		self.state.borrow().clone()
	}

	pub fn user(&self) -> Option<User> {
		self.state.borrow().user.clone()
	}

	pub fn is_resolved(&self) -> bool {
		self.state.borrow().resolved
	}

	pub fn access(&self, required: Role) -> Access {
		self.state.borrow().access(required)
	}

	pub fn dashboard_route(&self) -> Route {
		self.state.borrow().dashboard_route()
	}

	pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) -> Subscription {
		let id = self.next_listener.get();
		self.next_listener.set(id + 1);
		self.listeners.borrow_mut().push((id, Rc::new(listener)));
		Subscription { listeners: Rc::downgrade(&self.listeners), id }
	}

	fn set(&self, next: SessionState) {
		*self.state.borrow_mut() = next.clone();
		let listeners = self.listeners.borrow().iter().map(|(_, listener)| listener.clone()).collect::<Vec<_>>();
		for listener in listeners {
			listener(&next);
		}
	}

	/// Checks a stored token against the backend. A rejection signs out, unless a
	/// sign-in or sign-out already replaced the session while the check was out.
	pub async fn initialize(&self) {
		let Some(token) = self.slot.load() else {
			log::debug!(target: "session", "no stored session");
			self.set(SessionState { resolved: true, ..Default::default() });
			return;
		};
		self.client.set_token(Some(token.clone()));
		self.set(SessionState { token: Some(token.clone()), user: None, resolved: false });
		let epoch = self.epoch.get();
		let outcome = self.scope.run(self.client.get::<Envelope<Current>>("/auth/me").send()).await;
		if self.epoch.get() != epoch {
			log::debug!(target: "session", "restore superseded by a newer session");
			return;
		}
		match outcome {
			Ok(envelope) => {
				log::info!(target: "session", "restored session of {}", envelope.data.user.email);
				self.set(SessionState { token: Some(token), user: Some(envelope.data.user), resolved: true });
			}
			Err(ApiError::Cancelled) => {
				self.set(SessionState { token: Some(token), user: None, resolved: true });
			}
			Err(err) => {
				log::info!(target: "session", "stored session rejected: {err}");
				self.clear();
			}
		}
	}

	pub async fn login(&self, credentials: Credentials) -> Result<User, ApiError> {
		validate::required("Email", &credentials.email)?;
		validate::required("Password", &credentials.password)?;
		let body = json!({ "email": credentials.email.trim(), "password": credentials.password });
		let call = self.client.post::<Envelope<Granted>>("/auth/login").with_json(&body);
		let granted = self.scope.run(call.send()).await?.data;
		log::info!(target: "session", "signed in as {}", granted.user.email);
		Ok(self.establish(granted))
	}

	/// Creates an account and signs into it. The role comes from the backend's answer.
	pub async fn register(&self, registration: Registration) -> Result<User, ApiError> {
		let invitation = registration.check()?;
		let body = registration.body(invitation.as_ref());
		let call = self.client.post::<Envelope<Granted>>("/auth/register").with_json(&body);
		let granted = self.scope.run(call.send()).await?.data;
		if let Some(invitation) = &invitation {
			if granted.user.role != invitation.role {
				log::warn!(target: "session", "asked for {} but was granted {}", invitation.role, granted.user.role);
			}
		}
		log::info!(target: "session", "registered {} as {}", granted.user.email, granted.user.role);
		Ok(self.establish(granted))
	}

	fn establish(&self, granted: Granted) -> User {
		self.epoch.set(self.epoch.get() + 1);
		if let Err(err) = self.slot.save(&granted.token) {
			log::warn!(target: "session", "session will not survive a reload: {err}");
		}
		self.client.set_token(Some(granted.token.clone()));
		self.set(SessionState { token: Some(granted.token), user: Some(granted.user.clone()), resolved: true });
		granted.user
	}

	/// Abandons calls still in flight, such as a pending restore.
	pub fn close(&self) {
		self.scope.close();
	}

	pub fn logout(&self) {
		log::info!(target: "session", "signed out");
		self.clear();
	}

	fn clear(&self) {
		self.epoch.set(self.epoch.get() + 1);
		self.slot.clear();
		self.client.set_token(None);
		self.set(SessionState { token: None, user: None, resolved: true });
	}

	/// Swaps in an edited copy of the signed-in user; the token is untouched.
	pub fn update_user(&self, user: User) {
		let mut next = self.state();
		next.user = Some(user);
		self.set(next);
	}

	pub async fn change_password(&self, current: &str, new: &str, confirmation: &str) -> Result<(), ApiError> {
		validate::required("Current Password", current)?;
		validate::password(new, confirmation)?;
		if new == current {
			return Err(ValidationError::PasswordUnchanged.into());
		}
		let body = json!({ "currentPassword": current, "newPassword": new });
		let call = self.client.post::<()>("/auth/change-password").with_json(&body);
		self.scope.run(call.send_ignored()).await?;
		log::info!(target: "session", "password changed");
		Ok(())
	}

	pub async fn refresh_profile(&self) -> Result<User, ApiError> {
		let call = self.client.get::<Envelope<Current>>("/users/profile");
		let user = self.scope.run(call.send()).await?.data.user;
		self.update_user(user.clone());
		Ok(user)
	}

	pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, ApiError> {
		let call = self.client.patch::<Envelope<Current>>("/users/profile").with_json(patch);
		let user = self.scope.run(call.send()).await?.data.user;
		log::info!(target: "session", "profile updated");
		self.update_user(user.clone());
		Ok(user)
	}
}

/// What views see through `use_context::<Session>()`: the manager plus a
/// snapshot of its state, so changes re-render consumers.
#[derive(Clone, PartialEq)]
pub struct Session {
	manager: Rc<SessionManager>,
	pub state: SessionState,
}

impl std::ops::Deref for Session {
	type Target = SessionManager;

	fn deref(&self) -> &Self::Target {
		&self.manager
	}
}

impl Session {
	pub fn manager(&self) -> Rc<SessionManager> {
		self.manager.clone()
	}
}

#[derive(Properties, PartialEq)]
pub struct ProviderProps {
	pub manager: Rc<SessionManager>,
	#[prop_or_default]
	pub children: Html,
}

#[function_component]
pub fn Provider(ProviderProps { manager, children }: &ProviderProps) -> Html {
	let state = use_state_eq({
		let manager = manager.clone();
		move || manager.state()
	});
	use_effect_with(manager.clone(), {
		let state = state.clone();
		move |manager: &Rc<SessionManager>| {
			let subscription = manager.subscribe(move |next| state.set(next.clone()));
			if !manager.is_resolved() {
				let manager = manager.clone();
				crate::util::spawn_local("session", async move {
					manager.initialize().await;
					Ok(()) as Result<(), anyhow::Error>
				});
			}
			let manager = manager.clone();
			move || {
				drop(subscription);
				manager.close();
			}
		}
	});
	let session = Session { manager: manager.clone(), state: (*state).clone() };
	html! {
		<ContextProvider<Session> context={session}>
			{children.clone()}
		</ContextProvider<Session>>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		api::fake::{FakeBackend, ADMIN_EMAIL, ADMIN_PASSWORD},
		storage::{Backend, MemoryBackend},
	};

	const KEY: &str = "authToken";

	fn manager(backend: &FakeBackend, storage: &MemoryBackend) -> SessionManager {
		SessionManager::new(backend.client(), TokenSlot::new(Rc::new(storage.clone()), KEY))
	}

	fn admin() -> Credentials {
		Credentials { email: ADMIN_EMAIL.into(), password: ADMIN_PASSWORD.into() }
	}

	fn student(email: &str) -> Registration {
		Registration {
			name: "Grace Wanjiru".into(),
			email: email.into(),
			password: "faithful".into(),
			confirm_password: "faithful".into(),
			student_id: "ST-001".into(),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn login_then_logout_round_trip() {
		let backend = FakeBackend::new();
		let storage = MemoryBackend::new();
		let session = manager(&backend, &storage);

		let user = session.login(admin()).await.unwrap();
		assert_eq!(user.role, Role::Admin);
		let state = session.state();
		assert!(state.token.is_some() && state.user.is_some());
		assert_eq!(storage.get(KEY), state.token);
		assert_eq!(session.client().token(), state.token);

		session.logout();
		let state = session.state();
		assert!(state.token.is_none() && state.user.is_none());
		assert!(!storage.contains(KEY));
		session.logout();
		assert!(session.state().resolved);
	}

	#[tokio::test]
	async fn rejected_token_collapses_to_signed_out() {
		let backend = FakeBackend::new();
		let storage = MemoryBackend::new();
		storage.set(KEY, "expired-token").unwrap();
		let session = manager(&backend, &storage);

		session.initialize().await;
		let state = session.state();
		assert!(state.resolved);
		assert!(state.token.is_none() && state.user.is_none());
		assert!(!storage.contains(KEY));
		assert_eq!(session.client().token(), None);
	}

	#[tokio::test]
	async fn sign_in_during_restore_survives_a_late_rejection() {
		let backend = FakeBackend::new();
		let storage = MemoryBackend::new();
		storage.set(KEY, "expired-token").unwrap();
		let session = manager(&backend, &storage);
		let release = backend.hold_next();

		let session = &session;
		let sign_in = async move {
			session.login(admin()).await.unwrap();
			let rejection = json!({ "status": "fail", "message": "Invalid token. Please log in again." });
			release.send((401, rejection)).unwrap();
		};
		futures::join!(session.initialize(), sign_in);

		let state = session.state();
		assert!(state.resolved && state.is_authenticated());
		assert_eq!(state.role(), Some(Role::Admin));
		assert_ne!(state.token.as_deref(), Some("expired-token"));
		assert_eq!(storage.get(KEY), state.token);
		assert_eq!(session.client().token(), state.token);
	}

	#[tokio::test]
	async fn abandoned_restore_still_resolves() {
		let backend = FakeBackend::new();
		let storage = MemoryBackend::new();
		storage.set(KEY, "pending-token").unwrap();
		let session = manager(&backend, &storage);
		let _release = backend.hold_next();

		let restore = session.initialize();
		futures::pin_mut!(restore);
		assert!(futures::poll!(&mut restore).is_pending());
		assert!(!session.is_resolved());
		session.close();
		restore.await;

		let state = session.state();
		assert!(state.resolved);
		assert_eq!(state.token.as_deref(), Some("pending-token"));
		assert!(state.user.is_none());
		assert_eq!(storage.get(KEY).as_deref(), Some("pending-token"));
	}

	#[tokio::test]
	async fn unreachable_backend_also_signs_out() {
		let backend = FakeBackend::new();
		let storage = MemoryBackend::new();
		storage.set(KEY, &backend.issue_token(ADMIN_EMAIL).unwrap()).unwrap();
		backend.drop_next();
		let session = manager(&backend, &storage);
		session.initialize().await;
		assert!(!session.state().is_authenticated());
		assert!(!storage.contains(KEY));
	}

	#[tokio::test]
	async fn valid_token_restores_user() {
		let backend = FakeBackend::new();
		let storage = MemoryBackend::new();
		storage.set(KEY, &backend.issue_token(ADMIN_EMAIL).unwrap()).unwrap();
		let session = manager(&backend, &storage);
		assert_eq!(session.access(Role::Admin), Access::Pending);

		session.initialize().await;
		assert_eq!(session.user().unwrap().email, ADMIN_EMAIL);
		assert_eq!(session.access(Role::Admin), Access::Granted);
		assert_eq!(session.access(Role::Student), Access::Home);
		assert_eq!(session.dashboard_route(), Route::AdminDashboard);
	}

	#[tokio::test]
	async fn missing_token_resolves_without_request() {
		let backend = FakeBackend::new();
		let session = manager(&backend, &MemoryBackend::new());
		session.initialize().await;
		assert_eq!(backend.request_count(), 0);
		assert_eq!(session.access(Role::Student), Access::Login);
	}

	#[tokio::test]
	async fn failed_login_keeps_existing_session() {
		let backend = FakeBackend::new();
		let storage = MemoryBackend::new();
		let session = manager(&backend, &storage);
		session.login(admin()).await.unwrap();
		let before = session.state();

		let wrong = Credentials { email: ADMIN_EMAIL.into(), password: "guess".into() };
		let err = session.login(wrong).await.unwrap_err();
		assert_eq!(err.user_message(), "Incorrect email or password");
		assert_eq!(session.state(), before);
		assert_eq!(storage.get(KEY), before.token);
	}

	#[tokio::test]
	async fn registration_roles_come_from_the_backend() {
		let backend = FakeBackend::new();
		backend.invite("clergy-GRACE_2024", Role::Clergy);

		let plain = manager(&backend, &MemoryBackend::new());
		let user = plain.register(student("grace@example.com")).await.unwrap();
		assert_eq!(user.role, Role::Student);
		assert_eq!(user.profile.student_id, "ST-001");

		let invited = manager(&backend, &MemoryBackend::new());
		let registration = Registration {
			invitation_code: "clergy-GRACE_2024".into(),
			..student("pastor@example.com")
		};
		assert_eq!(invited.register(registration).await.unwrap().role, Role::Clergy);

		let forged = manager(&backend, &MemoryBackend::new());
		let before = backend.request_count();
		for code in ["letmein", "bishop-ABCDEFGH", "admin-short", "admin-has spaces"] {
			let registration = Registration { invitation_code: code.into(), ..student("eve@example.com") };
			let err = forged.register(registration).await.unwrap_err();
			assert!(matches!(err, ApiError::Validation(ValidationError::InvalidInvitation)), "{code}");
		}
		assert_eq!(backend.request_count(), before);
		assert!(!forged.state().is_authenticated());
	}

	#[tokio::test]
	async fn unknown_invitation_is_refused_by_backend() {
		let backend = FakeBackend::new();
		let session = manager(&backend, &MemoryBackend::new());
		let registration = Registration { invitation_code: "admin-NOTISSUED1".into(), ..student("eve@example.com") };
		let err = session.register(registration).await.unwrap_err();
		assert_eq!(err.user_message(), "Invalid or expired invitation code");
		assert!(session.user().is_none());
	}

	#[tokio::test]
	async fn registration_checks_run_before_sending() {
		let backend = FakeBackend::new();
		let session = manager(&backend, &MemoryBackend::new());
		let mismatch = Registration { confirm_password: "different".into(), ..student("a@example.com") };
		assert!(matches!(
			session.register(mismatch).await,
			Err(ApiError::Validation(ValidationError::PasswordMismatch))
		));
		let short = Registration { password: "abc".into(), confirm_password: "abc".into(), ..student("a@example.com") };
		assert!(matches!(
			session.register(short).await,
			Err(ApiError::Validation(ValidationError::PasswordTooShort))
		));
		assert_eq!(backend.request_count(), 0);
	}

	#[tokio::test]
	async fn listeners_see_changes_until_dropped() {
		let backend = FakeBackend::new();
		let session = manager(&backend, &MemoryBackend::new());
		let seen = Rc::new(Cell::new(0));
		let subscription = session.subscribe({
			let seen = seen.clone();
			move |_| seen.set(seen.get() + 1)
		});
		session.login(admin()).await.unwrap();
		assert_eq!(seen.get(), 1);
		drop(subscription);
		session.logout();
		assert_eq!(seen.get(), 1);
	}

	#[tokio::test]
	async fn password_and_profile_updates() {
		let backend = FakeBackend::new();
		let session = manager(&backend, &MemoryBackend::new());
		session.login(admin()).await.unwrap();

		let unchanged = session.change_password(ADMIN_PASSWORD, ADMIN_PASSWORD, ADMIN_PASSWORD).await;
		assert!(matches!(unchanged, Err(ApiError::Validation(ValidationError::PasswordUnchanged))));
		session.change_password(ADMIN_PASSWORD, "stronger1", "stronger1").await.unwrap();
		session.logout();
		assert!(session.login(admin()).await.is_err());
		session
			.login(Credentials { email: ADMIN_EMAIL.into(), password: "stronger1".into() })
			.await
			.unwrap();

		let patch = ProfilePatch { bio: Some("Serving since 2001".into()), ..Default::default() };
		let user = session.update_profile(&patch).await.unwrap();
		assert_eq!(user.profile.bio, "Serving since 2001");
		assert_eq!(session.user().unwrap().profile.bio, "Serving since 2001");
		assert_eq!(session.refresh_profile().await.unwrap().profile.bio, "Serving since 2001");
	}

	#[test]
	fn invitation_format() {
		assert_eq!(Invitation::parse(" admin-Abc_1234 ").unwrap().role, Role::Admin);
		assert_eq!(Invitation::parse("student-ABCDEFGH"), Err(ValidationError::InvalidInvitation));
		assert_eq!(Invitation::parse("clergy-"), Err(ValidationError::InvalidInvitation));
	}
}
