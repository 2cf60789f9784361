//! Browser front-end for the Teacher of Excellence ministry and education platform.

pub mod api;
pub mod components;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod filter;
pub mod form;
pub mod hooks;
pub mod logging;
pub mod notify;
pub mod page;
pub mod resource;
pub mod route;
pub mod session;
pub mod storage;
pub mod task;
pub mod util;
pub mod validate;

use crate::{
	api::{HttpClient, ReqwestTransport},
	components::{Header, Toaster},
	config::Config,
	hooks::Services,
	route::{Route, Routes},
	session::SessionManager,
	storage::{drafts::DraftStore, LocalBackend, TokenSlot},
};
use std::rc::Rc;
use yew::prelude::*;
use yew_router::BrowserRouter;

#[function_component]
pub fn App() -> Html {
	let services = use_memo((), |_| {
		let config = Rc::new(Config::default());
		log::info!(target: "app", "using api at {}", config.api_base_url);
		let client = Rc::new(HttpClient::new(&config, Rc::new(ReqwestTransport::new())));
		let drafts = Rc::new(DraftStore::load(Rc::new(LocalBackend), config.drafts_key.clone()));
		Services { config, client, drafts }
	});
	let manager = use_memo((), {
		let services = services.clone();
		move |_| {
			let slot = TokenSlot::new(Rc::new(LocalBackend), services.config.token_key.clone());
			Rc::new(SessionManager::new(services.client.clone(), slot))
		}
	});
	html! {
		<ContextProvider<Services> context={(*services).clone()}>
			<session::Provider manager={(*manager).clone()}>
				<BrowserRouter>
					<Header />
					<Toaster />
					<main>{Route::switch()}</main>
					<footer class="border-top py-4 mt-5 text-center text-muted small">
						{"Teacher of Excellence ministry"}
					</footer>
				</BrowserRouter>
			</session::Provider>
		</ContextProvider<Services>>
	}
}
