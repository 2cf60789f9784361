use crate::{
	components::Spinner,
	data::Sermon,
	hooks::{use_async, use_controller, AsyncHandle},
	resource::Controller,
	route::Route,
};
use itertools::Itertools;
use yew::prelude::*;
use yew_router::prelude::Link;

const FEATURED: usize = 3;

#[function_component]
pub fn Home() -> Html {
	let sermons = use_controller(Controller::<Sermon>::new);
	let recent: AsyncHandle<Vec<Sermon>, crate::api::ApiError> = use_async(true, {
		let sermons = sermons.clone();
		move || {
			let sermons = sermons.clone();
			Box::pin(async move {
				sermons.fetch_all().await?;
				let recent = sermons
					.items()
					.into_iter()
					.filter(|sermon| sermon.is_published)
					.sorted_by(|a, b| b.created_at.cmp(&a.created_at))
					.take(FEATURED)
					.collect::<Vec<_>>();
				Ok(recent) as Result<_, crate::api::ApiError>
			})
		}
	});

	let featured = match (&recent.data, &recent.error) {
		_ if recent.loading => html!(<Spinner />),
		(Some(sermons), _) if !sermons.is_empty() => html! {
			<div class="row g-4">
				{for sermons.iter().map(|sermon| html! {
					<div class="col-md-4" key={sermon.id.clone()}>
						<div class="card h-100 shadow-sm">
							<div class="card-body">
								<h5 class="card-title">{&sermon.title}</h5>
								<h6 class="card-subtitle mb-2 text-muted">{&sermon.scripture}</h6>
								<p class="card-text">{&sermon.description}</p>
							</div>
							<div class="card-footer bg-transparent">
								<Link<Route> classes="btn btn-outline-primary btn-sm" to={Route::Sermon { id: sermon.id.clone() }}>
									{"Read more"}
								</Link<Route>>
							</div>
						</div>
					</div>
				})}
			</div>
		},
		(_, Some(err)) => html!(<p class="text-muted">{err.user_message()}</p>),
		_ => html!(<p class="text-muted">{"No sermons have been published yet."}</p>),
	};

	html! {<>
		<section class="bg-light py-5 text-center">
			<div class="container">
				<h1 class="display-5 fw-bold">{"Teacher of Excellence"}</h1>
				<p class="lead">{"Sermons, prayers, books and theological education in one place."}</p>
				<div class="d-flex justify-content-center gap-2">
					<Link<Route> classes="btn btn-primary btn-lg" to={Route::Sermons}>{"Browse Sermons"}</Link<Route>>
					<Link<Route> classes="btn btn-outline-primary btn-lg" to={Route::Register}>{"Join Us"}</Link<Route>>
				</div>
			</div>
		</section>
		<section class="container py-5">
			<h2 class="mb-4">{"Recent Sermons"}</h2>
			{featured}
		</section>
	</>}
}
