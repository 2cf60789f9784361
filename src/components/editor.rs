use crate::{
	api::Attachment,
	form::{Editable, FieldKind, FieldSpec, FormValues},
	util,
};
use std::rc::Rc;
use yew::prelude::*;

enum Edit {
	Reset(FormValues),
	Set(&'static str, String),
	Attach(&'static str, Attachment),
	Detach(&'static str),
}

#[derive(Default, PartialEq)]
struct Draft(FormValues);

impl Reducible for Draft {
	type Action = Edit;

	fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
		let mut values = self.0.clone();
		match action {
			Edit::Reset(next) => values = next,
			Edit::Set(name, value) => values.set(name, value),
			Edit::Attach(name, attachment) => values.attach(name, attachment),
			Edit::Detach(name) => values.detach(name),
		}
		Rc::new(Self(values))
	}
}

/// What the editor is open for.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<R> {
	New,
	Existing(R),
}

#[derive(Properties, PartialEq)]
pub struct EditorProps<R: Editable> {
	/// `None` keeps the editor closed.
	pub target: Option<Target<R>>,
	#[prop_or_default]
	pub busy: bool,
	pub on_close: Callback<()>,
	/// Receives the record id when editing, and what was entered.
	pub on_submit: Callback<(Option<String>, FormValues)>,
}

/// Modal form generated from the record's field list.
#[function_component]
pub fn Editor<R: Editable>(props: &EditorProps<R>) -> Html {
	let draft = use_reducer_eq(Draft::default);
	let shown_for = use_state_eq(|| None::<Option<String>>);
	let target_id = props.target.as_ref().map(|target| match target {
		Target::New => None,
		Target::Existing(record) => Some(record.id().to_owned()),
	});
	if target_id != *shown_for {
		shown_for.set(target_id.clone());
		if let Some(target) = &props.target {
			draft.dispatch(Edit::Reset(match target {
				Target::New => R::blank(),
				Target::Existing(record) => record.values(),
			}));
		}
	}
	let Some(target) = &props.target else {
		return html! {};
	};
	let editing = matches!(target, Target::Existing(_));

	let close = props.on_close.reform(|_: MouseEvent| ());
	let submit = {
		let draft = draft.clone();
		let on_submit = props.on_submit.clone();
		let id = target_id.flatten();
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			on_submit.emit((id.clone(), draft.0.clone()));
		})
	};
	let fields = R::FIELDS.iter().map(|field| field_html(field, &draft, editing));
	let heading = match editing {
		true => format!("Edit {}", R::NOUN),
		false => format!("New {}", R::NOUN),
	};

	html! {
		<div class="modal d-block bg-dark bg-opacity-50" tabindex="-1">
			<div class="modal-dialog modal-lg modal-dialog-scrollable">
				<form class="modal-content" onsubmit={submit}>
					<div class="modal-header">
						<h5 class="modal-title text-capitalize">{heading}</h5>
						<button type="button" class="btn-close" onclick={close.clone()} />
					</div>
					<div class="modal-body">{for fields}</div>
					<div class="modal-footer">
						<button type="button" class="btn btn-outline-secondary" onclick={close}>{"Cancel"}</button>
						<button type="submit" class="btn btn-primary" disabled={props.busy}>
							{props.busy.then(|| html!(<span class="spinner-border spinner-border-sm me-2" />))}
							{"Save"}
						</button>
					</div>
				</form>
			</div>
		</div>
	}
}

fn setter(draft: &UseReducerHandle<Draft>, name: &'static str) -> Callback<String> {
	let draft = draft.clone();
	Callback::from(move |value| draft.dispatch(Edit::Set(name, value)))
}

fn field_html(field: &FieldSpec, draft: &UseReducerHandle<Draft>, editing: bool) -> Html {
	let id = format!("field-{}", field.name);
	let value = draft.0.get(field.name).to_owned();
	let set = setter(draft, field.name);
	let label = match field.required && !(field.is_file() && editing) {
		true => format!("{} *", field.label),
		false => field.label.to_owned(),
	};
	let text_input = |kind: &'static str| {
		html! {
			<input
				class="form-control" type={kind} id={id.clone()} name={field.name} value={value.clone()}
				oninput={set.reform(|event: InputEvent| util::input_value(&event))}
			/>
		}
	};
	let control = match field.kind {
		FieldKind::Text => text_input("text"),
		FieldKind::Email => text_input("email"),
		FieldKind::Date => text_input("date"),
		FieldKind::DateTime => text_input("datetime-local"),
		FieldKind::Number => text_input("number"),
		FieldKind::LongText => html! {
			<textarea
				class="form-control" rows="4" id={id.clone()} name={field.name} value={value.clone()}
				oninput={set.reform(|event: InputEvent| util::input_value(&event))}
			/>
		},
		FieldKind::Toggle => {
			return html! {
				<div class="form-check form-switch mb-3">
					<input
						class="form-check-input" type="checkbox" id={id.clone()} name={field.name}
						checked={value == "true"}
						onchange={set.reform(|event: Event| util::input_value(&event))}
					/>
					<label class="form-check-label" for={id.clone()}>{label}</label>
				</div>
			};
		}
		FieldKind::Choice(options) => html! {
			<select
				class="form-select" id={id.clone()} name={field.name}
				onchange={set.reform(|event: Event| util::input_value(&event))}
			>
				<option value="" selected={value.is_empty()} disabled=true>{"Choose..."}</option>
				{for options.iter().map(|option| html! {
					<option value={*option} selected={value == *option}>{*option}</option>
				})}
			</select>
		},
		FieldKind::File { accept } => file_input(field, draft, &id, accept, editing),
	};
	html! {
		<div class="mb-3">
			<label class="form-label" for={id}>{label}</label>
			{control}
		</div>
	}
}

fn file_input(field: &FieldSpec, draft: &UseReducerHandle<Draft>, id: &str, accept: &'static str, editing: bool) -> Html {
	let name = field.name;
	let onchange = {
		let draft = draft.clone();
		Callback::from(move |event: Event| {
			let Some(file) = util::picked_file(&event) else {
				draft.dispatch(Edit::Detach(name));
				return;
			};
			let draft = draft.clone();
			util::spawn_local("ui", async move {
				let attachment = util::read_file(file).await?;
				log::debug!(target: "ui", "attached {} to {name}", attachment.file_name);
				draft.dispatch(Edit::Attach(name, attachment));
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	let hint = match draft.0.attachment(name) {
		Some(attachment) => format!("{} ({})", attachment.file_name, util::format_size(attachment.bytes.len() as u64)),
		None if editing => "Leave empty to keep the current file".to_owned(),
		None => String::new(),
	};
	html! {
		<>
			<input class="form-control" type="file" id={id.to_owned()} name={name} {accept} {onchange} />
			<div class="form-text">{hint}</div>
		</>
	}
}
