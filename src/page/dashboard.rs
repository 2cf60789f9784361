use super::student::{progress, schedule, Progress};
use crate::{
	api::ApiError,
	components::Spinner,
	dashboard::Overview,
	data::{Assignment, Sermon, Submission, ZoomMeeting},
	hooks::{use_async, use_services, use_session},
	resource::Controller,
	route::Route,
};
use time::OffsetDateTime;
use yew::prelude::*;
use yew_router::prelude::Link;

#[derive(Properties, PartialEq)]
struct TileProps {
	title: AttrValue,
	icon: AttrValue,
	to: Route,
	#[prop_or_default]
	value: Option<usize>,
	#[prop_or_default]
	detail: Option<AttrValue>,
}

#[function_component]
fn Tile(props: &TileProps) -> Html {
	let value = match props.value {
		Some(value) => value.to_string(),
		None => "-".to_owned(),
	};
	html! {
		<div class="col-sm-6 col-lg-4">
			<Link<Route> classes="card h-100 shadow-sm text-decoration-none text-reset" to={props.to.clone()}>
				<div class="card-body d-flex align-items-center gap-3">
					<i class={classes!("bi", props.icon.to_string(), "fs-1", "text-primary")} />
					<div>
						<div class="fs-3 fw-bold">{value}</div>
						<div class="text-muted">{&props.title}</div>
						{props.detail.clone().map(|detail| html!(<small class="text-muted">{detail}</small>))}
					</div>
				</div>
			</Link<Route>>
		</div>
	}
}

#[function_component]
fn Welcome() -> Html {
	let session = use_session();
	let name = session.state.user.as_ref().map(|user| user.name.clone()).unwrap_or_default();
	html!(<h1 class="h3 mb-4">{format!("Welcome, {name}")}</h1>)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct StudentSummary {
	pending: usize,
	graded: usize,
	upcoming: usize,
}

#[function_component]
pub fn StudentDashboard() -> Html {
	let services = use_services();
	let summary = use_async(true, {
		let client = services.client.clone();
		move || {
			let client = client.clone();
			Box::pin(async move {
				let assignments = Controller::<Assignment>::new(client.clone());
				let mine = Controller::<Submission>::mine(client.clone());
				let meetings = Controller::<ZoomMeeting>::new(client);
				let (listed, submitted, scheduled) =
					futures::join!(assignments.fetch_all(), mine.fetch_all(), meetings.fetch_all());
				listed?;
				submitted?;
				scheduled?;
				let submissions = mine.items();
				let mut summary = StudentSummary::default();
				for assignment in assignments.items().iter().filter(|assignment| assignment.is_active) {
					match progress(assignment, &submissions) {
						Progress::Pending => summary.pending += 1,
						Progress::Graded(_) => summary.graded += 1,
						Progress::Submitted(_) => {}
					}
				}
				summary.upcoming = schedule(meetings.items(), OffsetDateTime::now_utc()).0.len();
				Ok(summary) as Result<_, ApiError>
			})
		}
	});
	let summary: StudentSummary = summary.data.unwrap_or_default();
	html! {
		<section class="container py-5">
			<Welcome />
			<div class="row g-4">
				<Tile title="Learning Materials" icon="bi-journal-bookmark" to={Route::StudentMaterials} />
				<Tile title="Pending Assignments" icon="bi-pencil-square" to={Route::StudentAssignments}
					value={summary.pending} detail={AttrValue::from(format!("{} graded", summary.graded))} />
				<Tile title="Upcoming Meetings" icon="bi-camera-video" to={Route::ZoomSchedule} value={summary.upcoming} />
			</div>
		</section>
	}
}

#[function_component]
pub fn ClergyDashboard() -> Html {
	let services = use_services();
	let session = use_session();
	let sermons = use_async(true, {
		let client = services.client.clone();
		let author = session.state.user.as_ref().map(|user| user.id.clone()).unwrap_or_default();
		move || {
			let sermons = Controller::<Sermon>::by_author(client.clone(), &author);
			Box::pin(async move {
				sermons.fetch_all().await?;
				let items = sermons.items();
				let published = items.iter().filter(|sermon| sermon.is_published).count();
				Ok((items.len(), published)) as Result<_, ApiError>
			})
		}
	});
	let (total, published) = match sermons.data {
		Some((total, published)) => (Some(total), Some(published)),
		None => (None, None),
	};
	html! {
		<section class="container py-5">
			<Welcome />
			<div class="row g-4">
				<Tile title="My Sermons" icon="bi-mic" to={Route::ClergySermons} value={total}
					detail={published.map(|published| AttrValue::from(format!("{published} published")))} />
				<Tile title="Prayers" icon="bi-heart" to={Route::ClergyPrayers} />
			</div>
		</section>
	}
}

#[function_component]
pub fn AdminDashboard() -> Html {
	let services = use_services();
	let overview = use_async(true, {
		let client = services.client.clone();
		move || {
			let client = client.clone();
			Box::pin(async move { Ok(Overview::load(client).await) as Result<_, ()> })
		}
	});
	if overview.loading {
		return html!(<Spinner />);
	}
	let counts: Overview = overview.data.unwrap_or_default();
	html! {
		<section class="container py-5">
			<Welcome />
			<div class="row g-4">
				<Tile title="Users" icon="bi-people" to={Route::AdminUsers} value={counts.users} />
				<Tile title="Sermons" icon="bi-mic" to={Route::AdminSermons} value={counts.sermons} />
				<Tile title="Prayers" icon="bi-heart" to={Route::AdminPrayers} value={counts.prayers} />
				<Tile title="Books" icon="bi-book" to={Route::AdminBooks} value={counts.books} />
				<Tile title="Assignments" icon="bi-pencil-square" to={Route::AdminAssignments} value={counts.assignments} />
				<Tile title="Learning Materials" icon="bi-journal-bookmark" to={Route::AdminMaterials} value={counts.materials}
					detail={AttrValue::from(format!("{} offline draft(s)", services.drafts.len()))} />
				<Tile title="Zoom Meetings" icon="bi-camera-video" to={Route::AdminZoom} value={counts.meetings} />
			</div>
		</section>
	}
}
