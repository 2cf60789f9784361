use crate::{
	api::HttpClient,
	config::Config,
	resource::{Controller, Resource},
	session::Session,
	storage::drafts::DraftStore,
};
use std::rc::Rc;
use yew::prelude::*;
use yew_hooks::{use_mount, UseAsyncState};

/// Long-lived pieces built once at startup.
#[derive(Clone)]
pub struct Services {
	pub config: Rc<Config>,
	pub client: Rc<HttpClient>,
	pub drafts: Rc<DraftStore>,
}

impl PartialEq for Services {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.client, &other.client) && Rc::ptr_eq(&self.drafts, &other.drafts)
	}
}

#[hook]
pub fn use_services() -> Services {
	use_context::<Services>().expect("services are provided by the app root")
}

#[hook]
pub fn use_session() -> Session {
	use_context::<Session>().expect("session provider is mounted by the app root")
}

/// A controller owned by the calling view. Its in-flight requests are
/// dropped when the view unmounts.
#[hook]
pub fn use_controller<R, F>(build: F) -> Rc<Controller<R>>
where
	R: Resource,
	F: FnOnce(Rc<HttpClient>) -> Controller<R>,
{
	let services = use_services();
	let controller = use_memo((), move |_| build(services.client.clone()));
	{
		let controller = controller.clone();
		use_effect_with((), move |_| move || controller.close());
	}
	controller
}

pub struct AsyncHandle<T, E> {
	state: UseStateHandle<UseAsyncState<T, E>>,
	run: Rc<dyn Fn()>,
}
impl<T, E> Clone for AsyncHandle<T, E> {
	fn clone(&self) -> Self {
		Self { state: self.state.clone(), run: self.run.clone() }
	}
}
impl<T, E> AsyncHandle<T, E> {
	pub fn run(&self) {
		(*self.run)();
	}
}
impl<T, E> std::ops::Deref for AsyncHandle<T, E> {
	type Target = UseAsyncState<T, E>;

	fn deref(&self) -> &Self::Target {
		&self.state
	}
}

fn pending<T, E>(loading: bool) -> UseAsyncState<T, E> {
	UseAsyncState { loading, data: None, error: None }
}

fn settled<T, E>(result: Result<T, E>) -> UseAsyncState<T, E> {
	match result {
		Ok(data) => UseAsyncState { loading: false, data: Some(data), error: None },
		Err(err) => UseAsyncState { loading: false, data: None, error: Some(err) },
	}
}

/// Runs `make_future` on demand through [`AsyncHandle::run`], and once on
/// mount when `run_first_mount` is set. A rerun clears the previous outcome.
#[hook]
pub fn use_async<F, T, E>(run_first_mount: bool, make_future: F) -> AsyncHandle<T, E>
where
	F: Fn() -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<T, E>>>> + 'static,
	T: 'static,
	E: 'static,
{
	let state = use_state(|| pending(run_first_mount));
	let make_future = Rc::new(make_future);
	let run: Rc<dyn Fn()> = {
		let state = state.clone();
		Rc::new(move || {
			state.set(pending(true));
			let state = state.clone();
			let future = make_future();
			wasm_bindgen_futures::spawn_local(async move {
				state.set(settled(future.await));
			});
		})
	};
	{
		let run = run.clone();
		use_mount(move || {
			if run_first_mount {
				run();
			}
		});
	}
	AsyncHandle { state, run }
}
