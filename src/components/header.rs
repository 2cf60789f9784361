use crate::{
	components::{user::Identification, AuthSwitch},
	hooks::use_session,
	route::Route,
};
use yew::prelude::*;
use yew_router::prelude::*;

const PUBLIC_LINKS: [(Route, &str); 6] = [
	(Route::Home, "Home"),
	(Route::About, "About"),
	(Route::Sermons, "Sermons"),
	(Route::Prayers, "Prayers"),
	(Route::Books, "Books"),
	(Route::Contact, "Contact"),
];

#[function_component]
pub fn Header() -> Html {
	let session = use_session();
	let navigator = use_navigator();
	let current = use_route::<Route>();

	let sign_out = {
		let session = session.clone();
		Callback::from(move |_: MouseEvent| {
			session.logout();
			if let Some(navigator) = &navigator {
				navigator.push(&Route::Home);
			}
		})
	};
	let links = PUBLIC_LINKS.iter().map(|(route, label)| {
		let classes = classes!("nav-link", (current.as_ref() == Some(route)).then_some("active"));
		html! {
			<li class="nav-item">
				<Link<Route> {classes} to={route.clone()}>{*label}</Link<Route>>
			</li>
		}
	});

	html! {
		<nav class="navbar navbar-expand-lg navbar-dark bg-primary">
			<div class="container">
				<Link<Route> classes="navbar-brand fw-bold" to={Route::Home}>
					<i class="bi bi-book me-2" />
					{"Teacher of Excellence"}
				</Link<Route>>
				<ul class="navbar-nav me-auto">{for links}</ul>
				<div class="d-flex align-items-center gap-2 text-light">
					<AuthSwitch
						identified={html! {<>
							<Link<Route> classes="btn btn-sm btn-light" to={session.state.dashboard_route()}>
								<i class="bi bi-speedometer2 me-1" />{"Dashboard"}
							</Link<Route>>
							<Link<Route> classes="text-light text-decoration-none" to={Route::Profile}>
								<Identification />
							</Link<Route>>
							<button class="btn btn-sm btn-outline-light" onclick={sign_out}>{"Sign Out"}</button>
						</>}}
						anonymous={html! {<>
							<Link<Route> classes="btn btn-sm btn-outline-light" to={Route::Login}>{"Sign In"}</Link<Route>>
							<Link<Route> classes="btn btn-sm btn-light" to={Route::Register}>{"Register"}</Link<Route>>
						</>}}
					/>
				</div>
			</div>
		</nav>
	}
}
