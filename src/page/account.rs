use crate::{
	components::user::role_badge,
	data::{ProfilePatch, Role},
	hooks::{use_services, use_session},
	notify,
	route::Route,
	session::{Credentials, Registration},
	util,
};
use yew::prelude::*;
use yew_router::prelude::*;

fn reducer<T: Clone + 'static>(state: &UseStateHandle<T>, apply: impl Fn(&mut T, String) + 'static) -> Callback<InputEvent> {
	let state = state.clone();
	Callback::from(move |event: InputEvent| {
		let mut value = (*state).clone();
		apply(&mut value, util::input_value(&event));
		state.set(value);
	})
}

#[function_component]
pub fn Login() -> Html {
	let session = use_session();
	let services = use_services();
	let navigator = use_navigator();
	let credentials = use_state(Credentials::default);
	let busy = use_state_eq(|| false);

	if let Some(user) = &session.state.user {
		return html!(<Redirect<Route> to={Route::dashboard_for(user.role)} />);
	}

	let onsubmit = {
		let manager = session.manager();
		let credentials = credentials.clone();
		let busy = busy.clone();
		let lifetime = services.config.toast_duration;
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			let manager = manager.clone();
			let credentials = (*credentials).clone();
			let busy = busy.clone();
			let navigator = navigator.clone();
			busy.set(true);
			util::spawn_local("ui", async move {
				match manager.login(credentials).await {
					Ok(user) => {
						notify::success(format!("Welcome back, {}", user.name), lifetime);
						if let Some(navigator) = navigator {
							navigator.push(&Route::dashboard_for(user.role));
						}
					}
					Err(err) => notify::failure("Login failed", &err, lifetime),
				}
				busy.set(false);
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};

	html! {
		<section class="container py-5" style="max-width: 28rem;">
			<form class="card card-body shadow-sm" {onsubmit}>
				<h1 class="h3 text-center mb-4">{"Sign In"}</h1>
				<label class="form-label" for="login-email">{"Email"}</label>
				<input class="form-control mb-3" id="login-email" type="email" value={credentials.email.clone()}
					oninput={reducer(&credentials, |credentials, value| credentials.email = value)} />
				<label class="form-label" for="login-password">{"Password"}</label>
				<input class="form-control mb-4" id="login-password" type="password" value={credentials.password.clone()}
					oninput={reducer(&credentials, |credentials, value| credentials.password = value)} />
				<button type="submit" class="btn btn-primary w-100" disabled={*busy}>
					{if *busy { "Signing in..." } else { "Sign In" }}
				</button>
				<p class="text-center mt-3 mb-0">
					{"No account yet? "}
					<Link<Route> to={Route::Register}>{"Register"}</Link<Route>>
				</p>
			</form>
		</section>
	}
}

#[function_component]
pub fn Register() -> Html {
	let session = use_session();
	let services = use_services();
	let navigator = use_navigator();
	let registration = use_state(Registration::default);
	let invited = use_state_eq(|| false);
	let busy = use_state_eq(|| false);

	if let Some(user) = &session.state.user {
		return html!(<Redirect<Route> to={Route::dashboard_for(user.role)} />);
	}

	let toggle_invited = {
		let invited = invited.clone();
		let registration = registration.clone();
		Callback::from(move |_: Event| {
			if *invited {
				let mut next = (*registration).clone();
				next.invitation_code.clear();
				registration.set(next);
			}
			invited.set(!*invited);
		})
	};
	let onsubmit = {
		let manager = session.manager();
		let registration = registration.clone();
		let busy = busy.clone();
		let lifetime = services.config.toast_duration;
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			let manager = manager.clone();
			let registration = (*registration).clone();
			let busy = busy.clone();
			let navigator = navigator.clone();
			busy.set(true);
			util::spawn_local("ui", async move {
				match manager.register(registration).await {
					Ok(user) => {
						notify::success("Account created", lifetime);
						if let Some(navigator) = navigator {
							navigator.push(&Route::dashboard_for(user.role));
						}
					}
					Err(err) => notify::failure("Registration failed", &err, lifetime),
				}
				busy.set(false);
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};

	let input = |label: &'static str, kind: &'static str, value: &str, apply: fn(&mut Registration, String)| {
		html! {
			<div class="mb-3">
				<label class="form-label">{label}</label>
				<input class="form-control" type={kind} value={value.to_owned()} oninput={reducer(&registration, apply)} />
			</div>
		}
	};
	let role_fields = match *invited {
		false => html! {<>
			{input("Student ID", "text", &registration.student_id, |r, v| r.student_id = v)}
			{input("Department", "text", &registration.department, |r, v| r.department = v)}
		</>},
		true => html! {<>
			{input("Invitation Code", "text", &registration.invitation_code, |r, v| r.invitation_code = v)}
			<div class="form-text mb-3">{"Clergy and administrators receive a code from the ministry office."}</div>
			{input("Church", "text", &registration.church, |r, v| r.church = v)}
			{input("Position", "text", &registration.position, |r, v| r.position = v)}
		</>},
	};

	html! {
		<section class="container py-5" style="max-width: 32rem;">
			<form class="card card-body shadow-sm" {onsubmit}>
				<h1 class="h3 text-center mb-4">{"Create an Account"}</h1>
				{input("Full Name *", "text", &registration.name, |r, v| r.name = v)}
				{input("Email *", "email", &registration.email, |r, v| r.email = v)}
				{input("Phone", "tel", &registration.phone, |r, v| r.phone = v)}
				{input("Password *", "password", &registration.password, |r, v| r.password = v)}
				{input("Confirm Password *", "password", &registration.confirm_password, |r, v| r.confirm_password = v)}
				<div class="form-check form-switch mb-3">
					<input class="form-check-input" type="checkbox" id="register-invited" checked={*invited} onchange={toggle_invited} />
					<label class="form-check-label" for="register-invited">{"I have an invitation code"}</label>
				</div>
				{role_fields}
				<button type="submit" class="btn btn-primary w-100" disabled={*busy}>
					{if *busy { "Creating account..." } else { "Register" }}
				</button>
				<p class="text-center mt-3 mb-0">
					{"Already registered? "}
					<Link<Route> to={Route::Login}>{"Sign in"}</Link<Route>>
				</p>
			</form>
		</section>
	}
}

#[derive(Clone, Default, PartialEq)]
struct PasswordChange {
	current: String,
	new: String,
	confirmation: String,
}

fn patch_of(user: &crate::data::User) -> ProfilePatch {
	let profile = &user.profile;
	ProfilePatch {
		phone: Some(profile.phone.clone()),
		bio: Some(profile.bio.clone()),
		student_id: Some(profile.student_id.clone()),
		department: Some(profile.department.clone()),
		year_of_study: Some(profile.year_of_study.clone()),
		church: Some(profile.church.clone()),
		position: Some(profile.position.clone()),
		..Default::default()
	}
}

/// Editing the signed-in user's own profile and password.
#[function_component]
pub fn Profile() -> Html {
	let session = use_session();
	let services = use_services();
	let patch = use_state({
		let user = session.state.user.clone();
		move || user.as_ref().map(patch_of).unwrap_or_default()
	});
	{
		let patch = patch.clone();
		use_effect_with(session.state.user.clone(), move |user| {
			if let Some(user) = user {
				patch.set(patch_of(user));
			}
		});
	}
	let password = use_state(PasswordChange::default);
	let lifetime = services.config.toast_duration;

	let Some(user) = session.state.user.clone() else {
		return match session.state.resolved {
			true => html!(<Redirect<Route> to={Route::Login} />),
			false => html!(<crate::components::Spinner />),
		};
	};

	let save_profile = {
		let manager = session.manager();
		let patch = patch.clone();
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			let manager = manager.clone();
			let patch = (*patch).clone();
			util::spawn_local("ui", async move {
				match manager.update_profile(&patch).await {
					Ok(_) => notify::success("Profile updated", lifetime),
					Err(err) => notify::failure("Could not update profile", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	let change_password = {
		let manager = session.manager();
		let password = password.clone();
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			let manager = manager.clone();
			let password = password.clone();
			let change = (*password).clone();
			util::spawn_local("ui", async move {
				match manager.change_password(&change.current, &change.new, &change.confirmation).await {
					Ok(()) => {
						notify::success("Password changed", lifetime);
						password.set(PasswordChange::default());
					}
					Err(err) => notify::failure("Could not change password", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};

	let field = |label: &'static str, value: &Option<String>, apply: fn(&mut ProfilePatch, String)| {
		html! {
			<div class="mb-3">
				<label class="form-label">{label}</label>
				<input class="form-control" value={value.clone().unwrap_or_default()}
					oninput={reducer(&patch, move |patch, value| apply(patch, value))} />
			</div>
		}
	};
	let role_fields = match user.role {
		Role::Student => html! {<>
			{field("Student ID", &patch.student_id, |p, v| p.student_id = Some(v))}
			{field("Department", &patch.department, |p, v| p.department = Some(v))}
			{field("Year of Study", &patch.year_of_study, |p, v| p.year_of_study = Some(v))}
		</>},
		Role::Clergy | Role::Admin => html! {<>
			{field("Church", &patch.church, |p, v| p.church = Some(v))}
			{field("Position", &patch.position, |p, v| p.position = Some(v))}
		</>},
	};
	let secret = |label: &'static str, value: &str, apply: fn(&mut PasswordChange, String)| {
		html! {
			<div class="mb-3">
				<label class="form-label">{label}</label>
				<input class="form-control" type="password" value={value.to_owned()} oninput={reducer(&password, apply)} />
			</div>
		}
	};

	html! {
		<section class="container py-5">
			<div class="d-flex align-items-center gap-3 mb-4">
				<h1 class="h3 mb-0">{&user.name}</h1>
				{role_badge(user.role)}
				<span class="text-muted">{&user.email}</span>
			</div>
			<div class="row g-4">
				<div class="col-md-7">
					<form class="card card-body shadow-sm" onsubmit={save_profile}>
						<h2 class="h5 mb-3">{"Profile"}</h2>
						{field("Phone", &patch.phone, |p, v| p.phone = Some(v))}
						<div class="mb-3">
							<label class="form-label">{"Bio"}</label>
							<textarea class="form-control" rows="3" value={patch.bio.clone().unwrap_or_default()}
								oninput={reducer(&patch, |patch, value| patch.bio = Some(value))} />
						</div>
						{role_fields}
						<button type="submit" class="btn btn-primary">{"Save Profile"}</button>
					</form>
				</div>
				<div class="col-md-5">
					<form class="card card-body shadow-sm" onsubmit={change_password}>
						<h2 class="h5 mb-3">{"Change Password"}</h2>
						{secret("Current Password", &password.current, |p, v| p.current = v)}
						{secret("New Password", &password.new, |p, v| p.new = v)}
						{secret("Confirm New Password", &password.confirmation, |p, v| p.confirmation = v)}
						<button type="submit" class="btn btn-outline-primary">{"Change Password"}</button>
					</form>
				</div>
			</div>
		</section>
	}
}
