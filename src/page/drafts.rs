use crate::{
	api::Attachment,
	data::{LearningMaterial, MaterialKind, MATERIAL_CATEGORIES},
	form::split_tags,
	hooks::{use_controller, use_services},
	resource::{Confirm, Controller},
	notify,
	storage::drafts::MaterialDraft,
	util::{self, BrowserConfirm},
	validate::{self, ValidationError},
};
use yew::prelude::*;

#[derive(Clone, PartialEq, Default)]
struct DraftForm {
	draft: MaterialDraft,
	tags: String,
}

impl DraftForm {
	fn of(draft: MaterialDraft) -> Self {
		Self { tags: draft.tags.join(", "), draft }
	}

	fn finish(&self) -> Result<MaterialDraft, ValidationError> {
		validate::required("Title", &self.draft.title)?;
		validate::required("Category", &self.draft.category)?;
		let mut draft = self.draft.clone();
		draft.tags = split_tags(&self.tags);
		Ok(draft)
	}
}

fn field(form: &UseStateHandle<DraftForm>, apply: fn(&mut DraftForm, String)) -> Callback<Event> {
	let form = form.clone();
	Callback::from(move |event: Event| {
		let mut next = (*form).clone();
		apply(&mut next, util::input_value(&event));
		form.set(next);
	})
}

/// Learning materials prepared offline and published later.
#[function_component]
pub fn Drafts() -> Html {
	let services = use_services();
	let materials = use_controller(Controller::<LearningMaterial>::new);
	let refresh = use_force_update();
	let form = use_state(DraftForm::default);
	let publishing = use_state_eq(|| None::<String>);
	let attachment = use_state_eq(|| None::<Attachment>);
	let busy = use_state_eq(|| false);
	let lifetime = services.config.toast_duration;
	let drafts = services.drafts.clone();

	let onsubmit = {
		let drafts = drafts.clone();
		let form = form.clone();
		let refresh = refresh.clone();
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			let draft = match form.finish() {
				Ok(draft) => draft,
				Err(err) => return notify::error("Draft not saved", err, lifetime),
			};
			match drafts.save(draft) {
				Ok(saved) => {
					notify::success(format!("Saved {}", saved.id), lifetime);
					form.set(DraftForm::default());
					refresh.force_update();
				}
				Err(err) => notify::error("Draft not saved", err, lifetime),
			}
		})
	};
	let reset = {
		let form = form.clone();
		Callback::from(move |_: MouseEvent| form.set(DraftForm::default()))
	};
	let pick = {
		let attachment = attachment.clone();
		Callback::from(move |event: Event| {
			let Some(file) = util::picked_file(&event) else {
				attachment.set(None);
				return;
			};
			let attachment = attachment.clone();
			util::spawn_local("ui", async move {
				match util::read_file(file).await {
					Ok(file) => attachment.set(Some(file)),
					Err(err) => notify::error("Could not read file", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	let publish = {
		let drafts = drafts.clone();
		let materials = materials.clone();
		let publishing = publishing.clone();
		let attachment = attachment.clone();
		let busy = busy.clone();
		let refresh = refresh.clone();
		Callback::from(move |_: MouseEvent| {
			let Some(id) = (*publishing).clone() else {
				return;
			};
			let drafts = drafts.clone();
			let materials = materials.clone();
			let file = (*attachment).clone();
			let publishing = publishing.clone();
			let attachment = attachment.clone();
			let busy = busy.clone();
			let refresh = refresh.clone();
			busy.set(true);
			util::spawn_local("ui", async move {
				match drafts.publish(&id, &materials, file).await {
					Ok(material) => {
						notify::success(format!("Published {}", material.title), lifetime);
						publishing.set(None);
						attachment.set(None);
					}
					Err(err) => notify::failure("Could not publish draft", &err, lifetime),
				}
				busy.set(false);
				refresh.force_update();
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};

	let rows = drafts
		.list()
		.into_iter()
		.map(|draft| {
			let edit = {
				let form = form.clone();
				let draft = draft.clone();
				Callback::from(move |_: MouseEvent| form.set(DraftForm::of(draft.clone())))
			};
			let open = {
				let publishing = publishing.clone();
				let attachment = attachment.clone();
				let id = draft.id.clone();
				Callback::from(move |_: MouseEvent| {
					attachment.set(None);
					publishing.set(Some(id.clone()));
				})
			};
			let remove = {
				let drafts = drafts.clone();
				let refresh = refresh.clone();
				let id = draft.id.clone();
				Callback::from(move |_: MouseEvent| {
					if !BrowserConfirm.confirm(&format!("Discard {id}?")) {
						return;
					}
					match drafts.remove(&id) {
						Ok(_) => refresh.force_update(),
						Err(err) => notify::error("Could not discard draft", err, lifetime),
					}
				})
			};
			html! {
				<tr key={draft.id.clone()}>
					<td><code>{&draft.id}</code></td>
					<td>{&draft.title}</td>
					<td>{&draft.category}</td>
					<td><span class="badge text-bg-secondary">{draft.kind.as_str()}</span></td>
					<td class="text-muted">{draft.file_name.clone().unwrap_or_default()}</td>
					<td class="text-end text-nowrap">
						<button class="btn btn-sm btn-outline-secondary me-1" onclick={edit}>{"Edit"}</button>
						<button class="btn btn-sm btn-outline-success me-1" onclick={open}>{"Publish"}</button>
						<button class="btn btn-sm btn-outline-danger" onclick={remove}>{"Discard"}</button>
					</td>
				</tr>
			}
		})
		.collect::<Html>();

	let publish_panel = (*publishing).clone().and_then(|id| drafts.get(&id)).map(|draft| {
		let cancel = {
			let publishing = publishing.clone();
			Callback::from(move |_: MouseEvent| publishing.set(None))
		};
		html! {
			<div class="card card-body shadow-sm mb-4 border-success">
				<h2 class="h5">{format!("Publish \"{}\"", draft.title)}</h2>
				{draft.file_name.clone().map(|name| html!(<p class="text-muted mb-2">{format!("Planned file: {name}")}</p>))}
				<input class="form-control mb-3" type="file" onchange={pick.clone()} />
				{(*attachment).as_ref().map(|file| html! {
					<p class="small mb-3">{format!("{} ({})", file.file_name, util::format_size(file.bytes.len() as u64))}</p>
				})}
				<div class="d-flex gap-2">
					<button class="btn btn-success" disabled={*busy} onclick={publish.clone()}>
						{if *busy { "Publishing..." } else { "Publish now" }}
					</button>
					<button class="btn btn-outline-secondary" onclick={cancel}>{"Cancel"}</button>
				</div>
			</div>
		}
	});

	let choice = |options: Vec<(&'static str, &'static str)>, current: &str| {
		options
			.into_iter()
			.map(|(value, label)| html!(<option {value} selected={current == value}>{label}</option>))
			.collect::<Html>()
	};

	html! {
		<section class="container py-5">
			<h1 class="h3 mb-4">{"Learning Material Drafts"}</h1>
			{publish_panel}
			<div class="row g-4">
				<div class="col-lg-5">
					<form class="card card-body shadow-sm" {onsubmit}>
						<h2 class="h5 mb-3">{if form.draft.id.is_empty() { "New Draft".to_owned() } else { format!("Editing {}", form.draft.id) }}</h2>
						<label class="form-label">{"Title *"}</label>
						<input class="form-control mb-3" value={form.draft.title.clone()}
							onchange={field(&form, |form, value| form.draft.title = value)} />
						<label class="form-label">{"Description"}</label>
						<textarea class="form-control mb-3" rows="3" value={form.draft.description.clone()}
							onchange={field(&form, |form, value| form.draft.description = value)} />
						<label class="form-label">{"Category *"}</label>
						<select class="form-select mb-3" onchange={field(&form, |form, value| form.draft.category = value)}>
							<option value="" selected={form.draft.category.is_empty()}>{"Choose..."}</option>
							{choice(MATERIAL_CATEGORIES.iter().map(|category| (*category, *category)).collect(), &form.draft.category)}
						</select>
						<label class="form-label">{"Type"}</label>
						<select class="form-select mb-3"
							onchange={field(&form, |form, value| form.draft.kind = MaterialKind::parse(&value).unwrap_or_default())}>
							{choice(MaterialKind::ALL.iter().map(|kind| (kind.as_str(), kind.as_str())).collect(), form.draft.kind.as_str())}
						</select>
						<label class="form-label">{"External Link"}</label>
						<input class="form-control mb-3" type="url" value={form.draft.external_link.clone()}
							onchange={field(&form, |form, value| form.draft.external_link = value)} />
						<label class="form-label">{"Tags"}</label>
						<input class="form-control mb-3" placeholder="comma, separated" value={form.tags.clone()}
							onchange={field(&form, |form, value| form.tags = value)} />
						<label class="form-label">{"File to attach later"}</label>
						<input class="form-control mb-3" placeholder="romans-week-1.pdf" value={form.draft.file_name.clone().unwrap_or_default()}
							onchange={field(&form, |form, value| form.draft.file_name = Some(value).filter(|name| !name.is_empty()))} />
						<div class="form-check form-switch mb-3">
							<input class="form-check-input" type="checkbox" id="draft-published" checked={form.draft.is_published}
								onchange={field(&form, |form, value| form.draft.is_published = value == "true")} />
							<label class="form-check-label" for="draft-published">{"Visible to students once published"}</label>
						</div>
						<div class="d-flex gap-2">
							<button type="submit" class="btn btn-primary">{"Save Draft"}</button>
							<button type="button" class="btn btn-outline-secondary" onclick={reset}>{"Clear"}</button>
						</div>
					</form>
				</div>
				<div class="col-lg-7">
					if drafts.is_empty() {
						<p class="text-muted">{"No drafts saved in this browser."}</p>
					} else {
						<div class="table-responsive">
							<table class="table table-hover align-middle">
								<thead>
									<tr>
										<th>{"Id"}</th>
										<th>{"Title"}</th>
										<th>{"Category"}</th>
										<th>{"Type"}</th>
										<th>{"File"}</th>
										<th />
									</tr>
								</thead>
								<tbody>{rows}</tbody>
							</table>
						</div>
					}
				</div>
			</div>
		</section>
	}
}
