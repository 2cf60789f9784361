use super::catalog::{download_button, fetch_file, pager, FileFetch};
use crate::{
	api::{ApiError, Download, HttpClient},
	components::{user::role_badge, Editor, Spinner, Target},
	data::{Assignment, Book, LearningMaterial, Prayer, Sermon, Submission, User, ZoomMeeting},
	form::{prepare, Editable, FormValues},
	hooks::{use_async, use_controller, use_services, use_session},
	notify,
	resource::{Controller, Removal},
	util::{self, BrowserConfirm},
};
use futures::{future::LocalBoxFuture, FutureExt};
use std::rc::Rc;
use time::OffsetDateTime;
use yew::prelude::*;

/// Which records a management view works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
	#[default]
	All,
	/// Only what the signed-in user created.
	Mine,
}

/// How a record shows up in a management table.
pub trait Tabular: Editable {
	const HEADING: &'static str;
	const COLUMNS: &'static [&'static str];
	const FILES: Option<FileFetch<Self>> = None;
	/// Wire name and label of the boolean flipped straight from the table.
	const TOGGLE: Option<(&'static str, &'static str)> = None;
	const CAN_CREATE: bool = true;
	/// Set for collections the backend pages; the table then shows a pager.
	const PAGE_SIZE: Option<u32> = None;

	fn cells(&self) -> Vec<Html>;

	fn flag(&self) -> bool {
		false
	}

	fn has_download(&self) -> bool {
		Self::FILES.is_some()
	}

	/// Extra panel opened below the row.
	fn expand(&self) -> Option<Html> {
		None
	}

	fn controller(client: Rc<HttpClient>, _scope: Scope, _user: Option<&User>) -> Controller<Self> {
		Controller::new(client)
	}
}

fn status(on: bool, yes: &'static str, no: &'static str) -> Html {
	match on {
		true => html!(<span class="badge bg-success">{yes}</span>),
		false => html!(<span class="badge bg-secondary">{no}</span>),
	}
}

fn day(raw: &Option<String>) -> String {
	raw.as_deref().map(|raw| raw.chars().take(10).collect()).unwrap_or_default()
}

fn capitalized(noun: &str) -> String {
	let mut chars = noun.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

impl Tabular for User {
	const HEADING: &'static str = "User Management";
	const COLUMNS: &'static [&'static str] = &["Name", "Email", "Role", "Status"];
	const TOGGLE: Option<(&'static str, &'static str)> = Some(("isActive", "Active"));
	const CAN_CREATE: bool = false;

	fn cells(&self) -> Vec<Html> {
		vec![
			html!(<strong>{&self.name}</strong>),
			html!({&self.email}),
			role_badge(self.role),
			status(self.is_active, "Active", "Inactive"),
		]
	}

	fn flag(&self) -> bool {
		self.is_active
	}
}

impl Tabular for Sermon {
	const HEADING: &'static str = "Sermon Management";
	const COLUMNS: &'static [&'static str] = &["Title", "Scripture", "Category", "Views", "Status"];
	const TOGGLE: Option<(&'static str, &'static str)> = Some(("isPublished", "Published"));

	fn cells(&self) -> Vec<Html> {
		vec![
			html!(<strong>{&self.title}</strong>),
			html!({&self.scripture}),
			html!({&self.category}),
			html!({self.views}),
			status(self.is_published, "Published", "Draft"),
		]
	}

	fn flag(&self) -> bool {
		self.is_published
	}

	fn controller(client: Rc<HttpClient>, scope: Scope, user: Option<&User>) -> Controller<Self> {
		match (scope, user) {
			(Scope::Mine, Some(user)) => Controller::by_author(client, &user.id),
			_ => Controller::new(client),
		}
	}
}

impl Tabular for Prayer {
	const HEADING: &'static str = "Prayer Management";
	const COLUMNS: &'static [&'static str] = &["Title", "Category", "Author", "Status"];
	const TOGGLE: Option<(&'static str, &'static str)> = Some(("isPublished", "Published"));
	const PAGE_SIZE: Option<u32> = Some(10);

	fn cells(&self) -> Vec<Html> {
		vec![
			html!(<strong>{&self.title}</strong>),
			html!({&self.category}),
			html!({&self.created_by.name}),
			status(self.is_published, "Published", "Draft"),
		]
	}

	fn flag(&self) -> bool {
		self.is_published
	}
}

impl Tabular for Book {
	const HEADING: &'static str = "Book Management";
	const COLUMNS: &'static [&'static str] = &["Title", "Author", "Category", "Downloads", "Status"];
	const FILES: Option<FileFetch<Self>> = Some(fetch_file::<Book>);
	const TOGGLE: Option<(&'static str, &'static str)> = Some(("isPublished", "Published"));

	fn cells(&self) -> Vec<Html> {
		vec![
			html!(<strong>{&self.title}</strong>),
			html!({&self.author}),
			html!({&self.category}),
			html!({self.number_of_downloads}),
			status(self.is_published, "Published", "Draft"),
		]
	}

	fn flag(&self) -> bool {
		self.is_published
	}
}

impl Tabular for Assignment {
	const HEADING: &'static str = "Assignment Management";
	const COLUMNS: &'static [&'static str] = &["Title", "Due", "Points", "Submissions", "Status"];
	const FILES: Option<FileFetch<Self>> = Some(fetch_file::<Assignment>);
	const TOGGLE: Option<(&'static str, &'static str)> = Some(("isActive", "Active"));

	fn cells(&self) -> Vec<Html> {
		vec![
			html!(<strong>{&self.title}</strong>),
			html!({day(&self.due_date)}),
			html!({self.points}),
			html!({self.number_of_submissions}),
			status(self.is_active, "Active", "Closed"),
		]
	}

	fn flag(&self) -> bool {
		self.is_active
	}

	fn has_download(&self) -> bool {
		self.file.is_some()
	}

	fn expand(&self) -> Option<Html> {
		Some(html!(<Submissions assignment={self.clone()} />))
	}
}

impl Tabular for LearningMaterial {
	const HEADING: &'static str = "Learning Material Management";
	const COLUMNS: &'static [&'static str] = &["Title", "Type", "Category", "Downloads", "Status"];
	const FILES: Option<FileFetch<Self>> = Some(fetch_file::<LearningMaterial>);
	const TOGGLE: Option<(&'static str, &'static str)> = Some(("isPublished", "Published"));

	fn cells(&self) -> Vec<Html> {
		vec![
			html!(<strong>{&self.title}</strong>),
			html!(<span class="text-uppercase small">{self.kind.as_str()}</span>),
			html!({&self.category}),
			html!({self.number_of_downloads}),
			status(self.is_published, "Published", "Draft"),
		]
	}

	fn flag(&self) -> bool {
		self.is_published
	}

	fn has_download(&self) -> bool {
		self.has_file()
	}
}

impl Tabular for ZoomMeeting {
	const HEADING: &'static str = "Zoom Meetings";
	const COLUMNS: &'static [&'static str] = &["Title", "Scheduled", "Link", "Status"];
	const TOGGLE: Option<(&'static str, &'static str)> = Some(("isActive", "Active"));

	fn cells(&self) -> Vec<Html> {
		let state = self.status_at(OffsetDateTime::now_utc());
		vec![
			html!(<strong>{&self.title}</strong>),
			html!({super::student::meeting_time(self)}),
			html!(<a href={self.meeting_link.clone()} target="_blank" rel="noopener">{"Join"}</a>),
			html!(<span class="badge bg-info text-dark">{state.label()}</span>),
		]
	}

	fn flag(&self) -> bool {
		self.is_active
	}

	fn controller(client: Rc<HttpClient>, scope: Scope, _user: Option<&User>) -> Controller<Self> {
		match scope {
			Scope::Mine => Controller::scheduled_by_me(client),
			Scope::All => Controller::new(client),
		}
	}
}

#[derive(Properties, PartialEq)]
pub struct ManageProps {
	#[prop_or_default]
	pub scope: Scope,
}

/// Searchable table of one collection with create, edit, toggle and delete.
#[function_component]
pub fn Manage<R: Tabular>(ManageProps { scope }: &ManageProps) -> Html {
	let services = use_services();
	let session = use_session();
	let controller = use_controller({
		let scope = *scope;
		let user = session.state.user.clone();
		move |client| R::controller(client, scope, user.as_ref())
	});
	let query = use_state_eq(String::new);
	let target = use_state_eq(|| None::<Target<R>>);
	let expanded = use_state_eq(|| None::<String>);
	let busy = use_state_eq(|| false);
	let page = use_state_eq(|| 1u32);
	let redraw = use_force_update();
	let load = use_async(false, {
		let controller = controller.clone();
		let page = *page;
		move || {
			let controller = controller.clone();
			Box::pin(async move { load_page(&controller, page).await })
		}
	});
	{
		let load = load.clone();
		use_effect_with(*page, move |_| load.run());
	}
	let lifetime = services.config.toast_duration;
	let on_done = {
		let load = load.clone();
		Callback::from(move |_: ()| match R::PAGE_SIZE {
			// writes refetch page one; reload the page on screen
			Some(_) => load.run(),
			None => redraw.force_update(),
		})
	};

	let on_submit = {
		let controller = controller.clone();
		let target = target.clone();
		let busy = busy.clone();
		let on_done = on_done.clone();
		Callback::from(move |(id, values): (Option<String>, FormValues)| {
			let payload = match prepare::<R>(&values, id.is_some()) {
				Ok(payload) => payload,
				Err(err) => return notify::failure("Error", &ApiError::from(err), lifetime),
			};
			busy.set(true);
			let (controller, target, busy, on_done) = (controller.clone(), target.clone(), busy.clone(), on_done.clone());
			util::spawn_local("ui", async move {
				let result = match &id {
					Some(id) => controller.update(id, payload).await,
					None => controller.create(payload).await,
				};
				busy.set(false);
				match result {
					Ok(_) => {
						let verb = if id.is_some() { "updated" } else { "created" };
						notify::success(format!("{} {verb}", capitalized(R::NOUN)), lifetime);
						target.set(None);
						on_done.emit(());
					}
					Err(ApiError::Cancelled) => {}
					Err(err) => notify::failure("Error", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	let remove = {
		let controller = controller.clone();
		let on_done = on_done.clone();
		Callback::from(move |id: String| {
			let (controller, on_done) = (controller.clone(), on_done.clone());
			util::spawn_local("ui", async move {
				match controller.remove(&id, &BrowserConfirm).await {
					Ok(Removal::Removed) => {
						notify::success(format!("{} deleted", capitalized(R::NOUN)), lifetime);
						on_done.emit(());
					}
					Ok(Removal::Declined) | Err(ApiError::Cancelled) => {}
					Err(err) => notify::failure("Error", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	let toggle = {
		let controller = controller.clone();
		let on_done = on_done.clone();
		Callback::from(move |(id, field, value): (String, &'static str, bool)| {
			let (controller, on_done) = (controller.clone(), on_done.clone());
			util::spawn_local("ui", async move {
				match controller.set_flag(&id, field, value).await {
					Ok(_) => on_done.emit(()),
					Err(ApiError::Cancelled) => {}
					Err(err) => notify::failure("Error", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};

	let row = |record: &R| {
		let id = record.id().to_owned();
		let edit = {
			let target = target.clone();
			let record = record.clone();
			Callback::from(move |_: MouseEvent| target.set(Some(Target::Existing(record.clone()))))
		};
		let flip = R::TOGGLE.map(|(field, label)| {
			let current = record.flag();
			let onclick = toggle.reform({
				let id = id.clone();
				move |_: MouseEvent| (id.clone(), field, !current)
			});
			let text = match current {
				true => format!("Unset {label}"),
				false => format!("Set {label}"),
			};
			html!(<button class="btn btn-sm btn-outline-secondary" title={text} {onclick}><i class="bi bi-toggle-on" /></button>)
		});
		let panel = record.expand();
		let is_expanded = expanded.as_deref() == Some(id.as_str());
		let expand_button = panel.is_some().then(|| {
			let expanded = expanded.clone();
			let id = id.clone();
			let onclick = Callback::from(move |_: MouseEvent| {
				expanded.set(match is_expanded {
					true => None,
					false => Some(id.clone()),
				})
			});
			html!(<button class="btn btn-sm btn-outline-info" {onclick}><i class="bi bi-people" /></button>)
		});
		let delete = remove.reform({
			let id = id.clone();
			move |_: MouseEvent| id.clone()
		});
		html! {
			<>
				<tr>
					{for record.cells().into_iter().map(|cell| html!(<td>{cell}</td>))}
					<td class="text-end">
						<div class="d-inline-flex gap-1">
							{flip}
							{expand_button}
							{download_button(
								R::FILES.filter(|_| record.has_download()),
								&id,
								&controller,
								on_done.clone(),
								&services.config,
							)}
							<button class="btn btn-sm btn-outline-primary" onclick={edit}><i class="bi bi-pencil" /></button>
							<button class="btn btn-sm btn-outline-danger" onclick={delete}><i class="bi bi-trash" /></button>
						</div>
					</td>
				</tr>
				{panel.filter(|_| is_expanded).map(|panel| html! {
					<tr><td colspan={(R::COLUMNS.len() + 1).to_string()}>{panel}</td></tr>
				})}
			</>
		}
	};

	let body = match (&load.data, &load.error) {
		_ if load.loading => html!(<Spinner />),
		(_, Some(err)) => html!(<div class="alert alert-warning">{err.user_message()}</div>),
		(None, None) => html!(<Spinner />),
		(Some(_), None) => {
			let items = controller.filtered(&query);
			html! {
				<div class="table-responsive">
					<table class="table table-hover align-middle">
						<thead>
							<tr>
								{for R::COLUMNS.iter().map(|column| html!(<th>{*column}</th>))}
								<th class="text-end">{"Actions"}</th>
							</tr>
						</thead>
						<tbody>{for items.iter().map(row)}</tbody>
					</table>
					{items.is_empty().then(|| html!(<p class="text-center text-muted">{format!("No {}s found.", R::NOUN)}</p>))}
				</div>
			}
		}
	};
	let create = R::CAN_CREATE.then(|| {
		let target = target.clone();
		let onclick = Callback::from(move |_: MouseEvent| target.set(Some(Target::New)));
		html!(<button class="btn btn-primary" {onclick}><i class="bi bi-plus-lg me-1" />{format!("New {}", R::NOUN)}</button>)
	});
	let on_close = {
		let target = target.clone();
		Callback::from(move |_: ()| target.set(None))
	};

	html! {
		<section class="container py-5">
			<div class="d-flex justify-content-between align-items-center mb-4">
				<h1 class="h3 mb-0">{R::HEADING}</h1>
				{create}
			</div>
			<input class="form-control mb-4" type="search" placeholder="Search..." value={(*query).clone()}
				oninput={{
					let query = query.clone();
					Callback::from(move |event: InputEvent| query.set(util::input_value(&event)))
				}} />
			{body}
			{R::PAGE_SIZE.map(|_| pager(controller.pagination(), &page))}
			<Editor<R> target={(*target).clone()} busy={*busy} {on_close} {on_submit} />
		</section>
	}
}

/// Reads the rows for one page of the table and returns how many the collection holds.
async fn load_page<R: Tabular>(controller: &Controller<R>, page: u32) -> Result<usize, ApiError> {
	match R::PAGE_SIZE {
		Some(limit) => {
			let pagination = controller.fetch_page(page, limit).await?;
			Ok(pagination.map_or(controller.len(), |pagination| pagination.total as usize))
		}
		None => controller.fetch_all().await,
	}
}

pub(super) fn fetch_submission(controller: Rc<Controller<Submission>>, id: String) -> LocalBoxFuture<'static, Result<Download, ApiError>> {
	async move { controller.download_submission(&id).await }.boxed_local()
}

#[derive(Properties, PartialEq)]
pub struct SubmissionsProps {
	pub assignment: Assignment,
}

/// Handed-in work for one assignment, with grading.
#[function_component]
pub fn Submissions(SubmissionsProps { assignment }: &SubmissionsProps) -> Html {
	let services = use_services();
	let controller = use_controller({
		let id = assignment.id.clone();
		move |client| Controller::<Submission>::for_assignment(client, &id)
	});
	let redraw = use_force_update();
	let load = use_async(true, {
		let controller = controller.clone();
		move || {
			let controller = controller.clone();
			Box::pin(async move { controller.fetch_all().await })
		}
	});
	let lifetime = services.config.toast_duration;
	let on_done = Callback::from(move |_: ()| redraw.force_update());

	if load.loading {
		return html!(<Spinner />);
	}
	if let Some(err) = &load.error {
		return html!(<div class="alert alert-warning mb-0">{err.user_message()}</div>);
	}
	let submissions = controller.items();
	if submissions.is_empty() {
		return html!(<p class="text-muted mb-0">{"No submissions yet."}</p>);
	}
	let max_points = assignment.points;
	html! {
		<ul class="list-group">
			{for submissions.iter().map(|submission| html! {
				<li class="list-group-item" key={submission.id.clone()}>
					<div class="d-flex justify-content-between align-items-start gap-3">
						<div>
							<strong>{&submission.student.name}</strong>
							<small class="text-muted ms-2">{util::format_date(submission.submitted_at)}</small>
							<p class="mb-1">{&submission.comment}</p>
						</div>
						{download_button(
							Some(fetch_submission as FileFetch<Submission>),
							&submission.id,
							&controller,
							on_done.clone(),
							&services.config,
						)}
					</div>
					<GradeForm
						submission={submission.clone()}
						{max_points}
						controller={controller.clone()}
						on_done={on_done.clone()}
						{lifetime}
					/>
				</li>
			})}
		</ul>
	}
}

#[derive(Properties)]
struct GradeFormProps {
	submission: Submission,
	max_points: u32,
	controller: Rc<Controller<Submission>>,
	on_done: Callback<()>,
	lifetime: std::time::Duration,
}

impl PartialEq for GradeFormProps {
	fn eq(&self, other: &Self) -> bool {
		self.submission == other.submission
			&& self.max_points == other.max_points
			&& Rc::ptr_eq(&self.controller, &other.controller)
	}
}

#[function_component]
fn GradeForm(props: &GradeFormProps) -> Html {
	let grade = use_state_eq(|| props.submission.grade.map(|grade| grade.to_string()).unwrap_or_default());
	let feedback = use_state_eq(|| props.submission.feedback.clone());
	let onsubmit = {
		let (grade, feedback) = (grade.clone(), feedback.clone());
		let controller = props.controller.clone();
		let id = props.submission.id.clone();
		let (max_points, lifetime, on_done) = (props.max_points, props.lifetime, props.on_done.clone());
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			let Ok(points) = grade.trim().parse::<u32>() else {
				let err = crate::validate::ValidationError::Required("Grade".into());
				return notify::failure("Error", &ApiError::from(err), lifetime);
			};
			let (controller, id, feedback, on_done) = (controller.clone(), id.clone(), (*feedback).clone(), on_done.clone());
			util::spawn_local("ui", async move {
				match controller.grade(&id, points, max_points, &feedback).await {
					Ok(_) => {
						notify::success("Submission graded", lifetime);
						on_done.emit(());
					}
					Err(err) => notify::failure("Error", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	html! {
		<form class="row g-2 align-items-center mt-2" {onsubmit}>
			<div class="col-auto">
				<div class="input-group input-group-sm">
					<input class="form-control" style="width: 5rem;" type="number" min="0" max={props.max_points.to_string()}
						value={(*grade).clone()}
						oninput={{
							let grade = grade.clone();
							Callback::from(move |event: InputEvent| grade.set(util::input_value(&event)))
						}} />
					<span class="input-group-text">{format!("/ {}", props.max_points)}</span>
				</div>
			</div>
			<div class="col">
				<input class="form-control form-control-sm" placeholder="Feedback" value={(*feedback).clone()}
					oninput={{
						let feedback = feedback.clone();
						Callback::from(move |event: InputEvent| feedback.set(util::input_value(&event)))
					}} />
			</div>
			<div class="col-auto">
				<button type="submit" class="btn btn-sm btn-primary">{"Save Grade"}</button>
			</div>
		</form>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::fake::FakeBackend;
	use crate::data::Role;

	#[test]
	fn nouns_are_capitalized_for_toasts() {
		assert_eq!(capitalized("sermon"), "Sermon");
		assert_eq!(capitalized(""), "");
	}

	#[tokio::test]
	async fn own_scope_reads_only_own_records() {
		let backend = FakeBackend::new();
		let clergy = backend.seed_account("Pastor John", "john@example.com", "password1", Role::Clergy);
		let admin = Controller::<Sermon>::new(backend.signed_in_client());
		admin
			.create(crate::resource::Payload::Json(serde_json::json!({ "title": "Admin's", "description": "x" })))
			.await
			.unwrap();
		let mine = Sermon::controller(backend.signed_in_client(), Scope::Mine, Some(&clergy));
		assert_eq!(mine.fetch_all().await.unwrap(), 0);
		assert_eq!(backend.last_request().unwrap().url, backend.url(&format!("/sermons/author/{}", clergy.id)));
		let all = Sermon::controller(backend.signed_in_client(), Scope::Mine, None);
		assert_eq!(all.fetch_all().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn prayer_table_walks_the_pages() {
		let backend = FakeBackend::new();
		let prayers = Prayer::controller(backend.signed_in_client(), Scope::All, None);
		for n in 0..13 {
			let body = serde_json::json!({ "title": format!("Intercession {n}"), "category": "Healing", "content": "Amen" });
			prayers.create(crate::resource::Payload::Json(body)).await.unwrap();
		}
		assert_eq!(load_page(&prayers, 2).await.unwrap(), 13);
		assert_eq!(prayers.len(), 3);
		assert_eq!(prayers.items()[0].title, "Intercession 10");
		let request = backend.last_request().unwrap();
		assert!(request.url.contains("page=2") && request.url.contains("limit=10"), "{}", request.url);

		let books = Book::controller(backend.signed_in_client(), Scope::All, None);
		assert_eq!(load_page(&books, 1).await.unwrap(), 0);
		assert!(!backend.last_request().unwrap().url.contains("page="));
	}
}
