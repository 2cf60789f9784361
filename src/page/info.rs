use crate::{hooks::use_services, notify, route::Route, util, validate};
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component]
pub fn About() -> Html {
	html! {
		<section class="container py-5" style="max-width: 48rem;">
			<h1 class="display-6 fw-bold text-center mb-4">{"About Eugene Kololi Choge"}</h1>
			<h2 class="h4 mt-4">{"The Journey"}</h2>
			<p class="text-muted">
				{"A teacher of the Word whose ministry began in the classroom and grew into pulpits, \
				seminaries and homes across the region."}
			</p>
			<h2 class="h4 mt-4">{"Ministry & Calling"}</h2>
			<p class="text-muted">
				{"The calling is simple: to open the Scriptures with clarity and to raise disciples \
				who teach others also."}
			</p>
			<h2 class="h4 mt-4">{"Mission"}</h2>
			<p class="text-muted">
				{"Equipping believers and church leaders through sound teaching, prayer and \
				accessible theological education."}
			</p>
		</section>
	}
}

#[derive(Clone, Default, PartialEq)]
struct Message {
	name: String,
	email: String,
	subject: String,
	body: String,
}

impl Message {
	fn check(&self) -> Result<(), validate::ValidationError> {
		validate::required("Name", &self.name)?;
		validate::required("Email", &self.email)?;
		validate::required("Message", &self.body)
	}
}

/// Contact form. Messages are acknowledged locally; the backend has no inbox for them.
#[function_component]
pub fn Contact() -> Html {
	let services = use_services();
	let message = use_state_eq(Message::default);

	fn reducer(state: &UseStateHandle<Message>, apply: impl Fn(&mut Message, String) + 'static) -> Callback<InputEvent> {
		let state = state.clone();
		Callback::from(move |event: InputEvent| {
			let mut message = (*state).clone();
			apply(&mut message, util::input_value(&event));
			state.set(message);
		})
	}

	let onsubmit = {
		let message = message.clone();
		let lifetime = services.config.toast_duration;
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			match message.check() {
				Ok(()) => {
					log::info!(target: "ui", "contact message from {}", message.email);
					notify::success("Message Sent", lifetime);
					message.set(Message::default());
				}
				Err(err) => notify::error("Error", err, lifetime),
			}
		})
	};

	html! {
		<section class="container py-5" style="max-width: 48rem;">
			<h1 class="display-6 fw-bold text-center">{"Get in Touch"}</h1>
			<p class="lead text-center text-muted mb-5">
				{"Questions about the ministry or a speaking engagement? We'd love to hear from you."}
			</p>
			<div class="row text-center mb-5">
				<div class="col"><i class="bi bi-envelope fs-3" /><p>{"contact@teacherexcellence.org"}</p></div>
				<div class="col"><i class="bi bi-telephone fs-3" /><p>{"+1 (555) 123-4567"}</p></div>
				<div class="col"><i class="bi bi-geo-alt fs-3" /><p>{"Available for speaking nationwide"}</p></div>
			</div>
			<form class="card card-body shadow-sm" {onsubmit}>
				<input class="form-control mb-3" placeholder="Your name" value={message.name.clone()}
					oninput={reducer(&message, |message, value| message.name = value)} />
				<input class="form-control mb-3" type="email" placeholder="Email" value={message.email.clone()}
					oninput={reducer(&message, |message, value| message.email = value)} />
				<input class="form-control mb-3" placeholder="Subject" value={message.subject.clone()}
					oninput={reducer(&message, |message, value| message.subject = value)} />
				<textarea class="form-control mb-3" rows="5" placeholder="Message" value={message.body.clone()}
					oninput={reducer(&message, |message, value| message.body = value)} />
				<button type="submit" class="btn btn-primary">{"Send Message"}</button>
			</form>
		</section>
	}
}

#[function_component]
pub fn NotFound() -> Html {
	html! {
		<section class="container py-5 text-center">
			<h1 class="display-1 fw-bold">{"404"}</h1>
			<p class="lead">{"Oops! Page not found"}</p>
			<Link<Route> classes="btn btn-primary" to={Route::Home}>{"Return to Home"}</Link<Route>>
		</section>
	}
}
