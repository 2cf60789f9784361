use crate::{data::Role, hooks::use_session, route::Route, session::Access};
use yew::prelude::*;
use yew_router::prelude::Redirect;

#[derive(Properties, PartialEq)]
pub struct GuardProps {
	pub role: Role,
	#[prop_or_default]
	pub children: Html,
}

/// Shows its children only to a signed-in user of `role`.
#[function_component]
pub fn Guard(GuardProps { role, children }: &GuardProps) -> Html {
	let session = use_session();
	match session.state.access(*role) {
		Access::Pending => html!(<Spinner />),
		Access::Login => html!(<Redirect<Route> to={Route::Login} />),
		Access::Home => html!(<Redirect<Route> to={Route::Home} />),
		Access::Granted => children.clone(),
	}
}

#[function_component]
pub fn Spinner() -> Html {
	html! {
		<div class="d-flex justify-content-center my-5">
			<div class="spinner-border text-primary" role="status">
				<span class="visually-hidden">{"Loading..."}</span>
			</div>
		</div>
	}
}
