use crate::hooks::use_session;
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq, Properties)]
pub struct AuthSwitchProps {
	#[prop_or_default]
	pub identified: Option<Html>,
	#[prop_or_default]
	pub anonymous: Option<Html>,
}

#[function_component]
pub fn AuthSwitch(props: &AuthSwitchProps) -> Html {
	let session = use_session();
	let empty = || html! {};
	match session.state.is_authenticated() {
		true => props.identified.clone().unwrap_or_else(empty),
		false => props.anonymous.clone().unwrap_or_else(empty),
	}
}
