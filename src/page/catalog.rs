//! Public and student-facing browsing: a searchable card grid per collection and a detail view.

use crate::{
	api::{ApiError, Download, Pagination},
	components::Spinner,
	config::Config,
	data::{Book, LearningMaterial, MaterialKind, Prayer, Sermon},
	hooks::{use_async, use_controller, use_services},
	notify,
	resource::{Controller, Downloadable, Resource},
	route::Route,
	util,
};
use futures::{future::LocalBoxFuture, FutureExt};
use std::rc::Rc;
use yew::prelude::*;
use yew_router::prelude::Link;

pub type FileFetch<R> = fn(Rc<Controller<R>>, String) -> LocalBoxFuture<'static, Result<Download, ApiError>>;

pub fn fetch_file<R: Downloadable>(controller: Rc<Controller<R>>, id: String) -> LocalBoxFuture<'static, Result<Download, ApiError>> {
	async move { controller.download(&id).await }.boxed_local()
}

/// How a record shows up when browsing.
pub trait Listing: Resource {
	const HEADING: &'static str;
	const BLURB: &'static str;
	const FILES: Option<FileFetch<Self>> = None;
	/// Records per page when the collection is read page by page.
	const PAGE_SIZE: Option<u32> = None;

	fn index_route() -> Route;

	fn is_visible(&self) -> bool {
		true
	}

	fn has_download(&self) -> bool {
		Self::FILES.is_some()
	}

	fn detail_route(&self) -> Option<Route> {
		None
	}

	fn card(&self, config: &Config) -> Html;

	fn detail(&self, config: &Config) -> Html {
		self.card(config)
	}
}

fn badge(text: &str) -> Html {
	if text.is_empty() {
		return html! {};
	}
	html!(<span class="badge bg-secondary me-1">{text.to_owned()}</span>)
}

fn tags(tags: &[String]) -> Html {
	html! {
		<div class="mb-2">
			{for tags.iter().map(|tag| html!(<span class="badge rounded-pill text-bg-light border me-1">{format!("#{tag}")}</span>))}
		</div>
	}
}

fn excerpt(text: &str, limit: usize) -> String {
	match text.char_indices().nth(limit) {
		Some((end, _)) => format!("{}...", text[..end].trim_end()),
		None => text.to_owned(),
	}
}

impl Listing for Sermon {
	const HEADING: &'static str = "Sermons";
	const BLURB: &'static str = "Messages of faith, hope and teaching from the pulpit.";

	fn index_route() -> Route {
		Route::Sermons
	}

	fn is_visible(&self) -> bool {
		self.is_published
	}

	fn detail_route(&self) -> Option<Route> {
		Some(Route::Sermon { id: self.id.clone() })
	}

	fn card(&self, _config: &Config) -> Html {
		let date = match &self.date {
			Some(date) => date.chars().take(10).collect(),
			None => util::format_date(self.created_at),
		};
		html! {<>
			<div class="mb-2">{badge(&self.category)}</div>
			<h5 class="card-title">{&self.title}</h5>
			<h6 class="card-subtitle mb-2 text-muted">{&self.scripture}</h6>
			<p class="card-text">{excerpt(&self.description, 160)}</p>
			{tags(&self.tags)}
			<small class="text-muted">{format!("{} · {date} · {} views", self.created_by.name, self.views)}</small>
		</>}
	}

	fn detail(&self, config: &Config) -> Html {
		html! {<>
			{self.card(config)}
			<hr />
			<div class="lh-lg" style="white-space: pre-line;">{&self.content}</div>
			{self.audio_url.as_ref().map(|src| html!(<audio class="w-100 mt-3" controls=true src={src.clone()} />))}
			{self.video_url.as_ref().map(|href| html! {
				<a class="btn btn-outline-danger mt-3" href={href.clone()} target="_blank" rel="noopener">
					<i class="bi bi-play-btn me-1" />{"Watch the video"}
				</a>
			})}
		</>}
	}
}

impl Listing for Prayer {
	const HEADING: &'static str = "Prayers";
	const BLURB: &'static str = "Prayers for every season of life.";
	const PAGE_SIZE: Option<u32> = Some(12);

	fn index_route() -> Route {
		Route::Prayers
	}

	fn is_visible(&self) -> bool {
		self.is_published
	}

	fn detail_route(&self) -> Option<Route> {
		Some(Route::Prayer { id: self.id.clone() })
	}

	fn card(&self, _config: &Config) -> Html {
		html! {<>
			<div class="mb-2">{badge(&self.category)}</div>
			<h5 class="card-title">{&self.title}</h5>
			<p class="card-text">{excerpt(&self.content, 150)}</p>
		</>}
	}

	fn detail(&self, _config: &Config) -> Html {
		html! {<>
			<div class="mb-2">{badge(&self.category)}</div>
			<h1 class="h3">{&self.title}</h1>
			<blockquote class="blockquote fs-6 lh-lg" style="white-space: pre-line;">{&self.content}</blockquote>
			<small class="text-muted">{format!("Shared by {}", self.created_by.name)}</small>
		</>}
	}
}

impl Listing for Book {
	const HEADING: &'static str = "Books";
	const BLURB: &'static str = "Free books for spiritual growth and study.";
	const FILES: Option<FileFetch<Self>> = Some(fetch_file::<Book>);

	fn index_route() -> Route {
		Route::Books
	}

	fn is_visible(&self) -> bool {
		self.is_published
	}

	fn card(&self, config: &Config) -> Html {
		html! {<>
			<img class="card-img-top mb-3 object-fit-cover" style="height: 14rem;" alt={self.title.clone()}
				src={self.cover_url(&config.api_base_url)} />
			<div class="mb-2">{badge(&self.category)}</div>
			<h5 class="card-title">{&self.title}</h5>
			<h6 class="card-subtitle mb-2 text-muted">{format!("by {}", self.author)}</h6>
			<p class="card-text">{excerpt(&self.description, 160)}</p>
			<small class="text-muted">{format!("{} downloads", self.number_of_downloads)}</small>
		</>}
	}
}

impl Listing for LearningMaterial {
	const HEADING: &'static str = "Learning Materials";
	const BLURB: &'static str = "Course readings, notes and videos for enrolled students.";
	const FILES: Option<FileFetch<Self>> = Some(fetch_file::<LearningMaterial>);

	fn index_route() -> Route {
		Route::StudentMaterials
	}

	fn is_visible(&self) -> bool {
		self.is_published
	}

	fn has_download(&self) -> bool {
		self.has_file()
	}

	fn card(&self, _config: &Config) -> Html {
		let icon = match self.kind {
			MaterialKind::Pdf => "bi bi-file-earmark-pdf text-danger",
			MaterialKind::Video => "bi bi-camera-video text-primary",
			MaterialKind::Note => "bi bi-journal-text text-success",
			MaterialKind::Image => "bi bi-image text-warning",
		};
		html! {<>
			<div class="d-flex align-items-center gap-2 mb-2">
				<i class={classes!(icon, "fs-4")} />
				{badge(&self.category)}
				{badge(self.kind.as_str())}
			</div>
			<h5 class="card-title">{&self.title}</h5>
			<p class="card-text">{excerpt(&self.description, 160)}</p>
			{tags(&self.tags)}
			{self.external_link.as_ref().filter(|link| !link.is_empty()).map(|href| html! {
				<a class="d-block mb-2" href={href.clone()} target="_blank" rel="noopener">{"Open link"}</a>
			})}
			<small class="text-muted">
				{format!("{} downloads · {} views", self.number_of_downloads, self.number_of_views)}
				{self.file_url.as_ref().map(|file| format!(" · {}", util::format_size(file.size)))}
			</small>
		</>}
	}
}

/// A button fetching the record's file and handing it to the browser.
pub(super) fn download_button<R: Resource>(
	fetch: Option<FileFetch<R>>,
	id: &str,
	controller: &Rc<Controller<R>>,
	on_done: Callback<()>,
	config: &Config,
) -> Html {
	let Some(fetch) = fetch else {
		return html! {};
	};
	let onclick = {
		let controller = controller.clone();
		let id = id.to_owned();
		let fallback = format!("{}.bin", R::NOUN);
		let lifetime = config.toast_duration;
		Callback::from(move |_: MouseEvent| {
			let future = fetch(controller.clone(), id.clone());
			let fallback = fallback.clone();
			let on_done = on_done.clone();
			util::spawn_local("ui", async move {
				match future.await {
					Ok(download) => {
						util::save_file(&download, &fallback)?;
						notify::success("Download started", lifetime);
						on_done.emit(());
					}
					Err(err) => notify::failure("Download failed", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	html! {
		<button class="btn btn-sm btn-success" {onclick}>
			<i class="bi bi-download me-1" />{"Download"}
		</button>
	}
}

#[function_component]
pub fn Catalog<R: Listing>() -> Html {
	let services = use_services();
	let controller = use_controller(Controller::<R>::new);
	let query = use_state_eq(String::new);
	let page = use_state_eq(|| 1u32);
	let redraw = use_force_update();
	let load = use_async(false, {
		let controller = controller.clone();
		let page = *page;
		move || {
			let controller = controller.clone();
			Box::pin(async move {
				match R::PAGE_SIZE {
					Some(limit) => controller.fetch_page(page, limit).await.map(|_| ()),
					None => controller.fetch_all().await.map(|_| ()),
				}
			})
		}
	});
	{
		let load = load.clone();
		use_effect_with(*page, move |_| load.run());
	}
	let on_done = Callback::from(move |_: ()| redraw.force_update());

	let body = match (&load.data, &load.error) {
		_ if load.loading => html!(<Spinner />),
		(_, Some(err)) => html!(<div class="alert alert-warning">{err.user_message()}</div>),
		(None, None) => html!(<Spinner />),
		(Some(()), None) => {
			let items = controller.filtered(&query).into_iter().filter(R::is_visible).collect::<Vec<_>>();
			if items.is_empty() {
				html!(<p class="text-center text-muted py-5">{format!("No {} found.", R::HEADING.to_lowercase())}</p>)
			} else {
				html! {
					<div class="row g-4">
						{for items.iter().map(|record| html! {
							<div class="col-md-6 col-lg-4" key={record.id().to_owned()}>
								<div class="card h-100 shadow-sm">
									<div class="card-body">{record.card(&services.config)}</div>
									<div class="card-footer bg-transparent d-flex gap-2">
										{record.detail_route().map(|to| html! {
											<Link<Route> classes="btn btn-sm btn-outline-primary" {to}>{"Read more"}</Link<Route>>
										})}
										{download_button(
											R::FILES.filter(|_| record.has_download()),
											record.id(),
											&controller,
											on_done.clone(),
											&services.config,
										)}
									</div>
								</div>
							</div>
						})}
					</div>
				}
			}
		}
	};

	html! {
		<section class="container py-5">
			<h1 class="display-6 fw-bold">{R::HEADING}</h1>
			<p class="lead text-muted">{R::BLURB}</p>
			<input class="form-control mb-4" type="search" placeholder="Search..." value={(*query).clone()}
				oninput={{
					let query = query.clone();
					Callback::from(move |event: InputEvent| query.set(util::input_value(&event)))
				}} />
			{body}
			{pager(controller.pagination(), &page)}
		</section>
	}
}

pub(super) fn pager(pagination: Option<Pagination>, page: &UseStateHandle<u32>) -> Html {
	let Some(pagination) = pagination.filter(|pagination| pagination.pages > 1) else {
		return html! {};
	};
	let go = |to: u32| {
		let page = page.clone();
		Callback::from(move |_: MouseEvent| page.set(to))
	};
	let current = pagination.current.max(1);
	html! {
		<nav class="d-flex justify-content-center align-items-center gap-3 mt-4">
			<button class="btn btn-outline-primary btn-sm" disabled={current <= 1} onclick={go(current.saturating_sub(1))}>
				{"Previous"}
			</button>
			<span class="text-muted">{format!("Page {current} of {} ({} total)", pagination.pages, pagination.total)}</span>
			<button class="btn btn-outline-primary btn-sm" disabled={current >= pagination.pages} onclick={go(current + 1)}>
				{"Next"}
			</button>
		</nav>
	}
}

#[derive(Properties, PartialEq)]
pub struct DetailProps {
	pub id: String,
}

#[function_component]
pub fn Detail<R: Listing>(DetailProps { id }: &DetailProps) -> Html {
	let services = use_services();
	let controller = use_controller(Controller::<R>::new);
	let load = use_async(false, {
		let controller = controller.clone();
		let id = id.clone();
		move || {
			let controller = controller.clone();
			let id = id.clone();
			Box::pin(async move { controller.fetch(&id).await })
		}
	});
	{
		let load = load.clone();
		use_effect_with(id.clone(), move |_| load.run());
	}

	let body = match (&load.data, &load.error) {
		(Some(record), _) if record.is_visible() => html! {
			<article class="card card-body shadow-sm">{record.detail(&services.config)}</article>
		},
		(_, Some(err)) if err.status() != Some(404) => html!(<div class="alert alert-warning">{err.user_message()}</div>),
		(None, None) => html!(<Spinner />),
		_ => html!(<p class="text-center text-muted py-5">{format!("This {} could not be found.", R::NOUN)}</p>),
	};
	html! {
		<section class="container py-5" style="max-width: 52rem;">
			<Link<Route> classes="btn btn-link px-0 mb-3" to={R::index_route()}>{format!("Back to {}", R::HEADING)}</Link<Route>>
			{body}
		</section>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn excerpts_cut_on_char_boundaries() {
		assert_eq!(excerpt("short", 10), "short");
		assert_eq!(excerpt("Amazing grace, how sweet", 7), "Amazing...");
		assert_eq!(excerpt("ñandú ñandú", 5), "ñandú...");
	}

	#[test]
	fn only_published_records_are_browsable() {
		let mut book: Book = serde_json::from_value(serde_json::json!({ "_id": "b1", "title": "Purpose" })).unwrap();
		assert!(!book.is_visible());
		book.is_published = true;
		assert!(book.is_visible() && book.has_download());
		let material: LearningMaterial =
			serde_json::from_value(serde_json::json!({ "_id": "m1", "title": "Romans", "isPublished": true })).unwrap();
		assert!(!material.has_download());
	}
}
