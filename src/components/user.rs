use crate::{data::Role, hooks::use_session};
use yew::prelude::*;

pub fn role_badge(role: Role) -> Html {
	let class = match role {
		Role::Student => "badge bg-info",
		Role::Clergy => "badge bg-warning text-dark",
		Role::Admin => "badge bg-danger",
	};
	html!(<span {class}>{role.as_str()}</span>)
}

#[function_component]
pub fn Identification() -> Html {
	let session = use_session();
	let Some(user) = &session.state.user else {
		return html! {};
	};
	html! {
		<span class="d-inline-flex align-items-center gap-2">
			<i class="bi bi-person-circle" />
			<span>{&user.name}</span>
			{role_badge(user.role)}
		</span>
	}
}
