use super::{
	catalog::{download_button, fetch_file, FileFetch},
	manage::fetch_submission,
};
use crate::{
	api::{ApiError, Attachment},
	components::Spinner,
	data::{Assignment, MeetingStatus, Submission, ZoomMeeting},
	hooks::{use_async, use_controller, use_services},
	notify,
	resource::Controller,
	util,
	validate::ValidationError,
};
use itertools::Itertools;
use std::rc::Rc;
use time::OffsetDateTime;
use yew::prelude::*;

pub(super) fn meeting_time(meeting: &ZoomMeeting) -> String {
	match meeting.starts_at() {
		Some(at) => format!("{} at {:02}:{:02} UTC", util::format_date(Some(at)), at.hour(), at.minute()),
		None => meeting.scheduled_date.clone(),
	}
}

/// Where a student stands on one assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress<'a> {
	Pending,
	Submitted(&'a Submission),
	Graded(&'a Submission),
}

pub fn progress<'a>(assignment: &Assignment, submissions: &'a [Submission]) -> Progress<'a> {
	match submissions.iter().find(|submission| submission.assignment.id() == assignment.id) {
		None => Progress::Pending,
		Some(submission) if submission.is_graded() => Progress::Graded(submission),
		Some(submission) => Progress::Submitted(submission),
	}
}

#[function_component]
pub fn StudentAssignments() -> Html {
	let services = use_services();
	let assignments = use_controller(Controller::<Assignment>::new);
	let mine = use_controller(Controller::<Submission>::mine);
	let redraw = use_force_update();
	let load = use_async(true, {
		let (assignments, mine) = (assignments.clone(), mine.clone());
		move || {
			let (assignments, mine) = (assignments.clone(), mine.clone());
			Box::pin(async move {
				let (listed, submitted) = futures::join!(assignments.fetch_all(), mine.fetch_all());
				listed?;
				submitted?;
				Ok(()) as Result<(), ApiError>
			})
		}
	});
	let on_done = Callback::from(move |_: ()| redraw.force_update());
	let reload = {
		let load = load.clone();
		Callback::from(move |_: ()| load.run())
	};

	if load.loading {
		return html!(<Spinner />);
	}
	if let Some(err) = &load.error {
		return html!(<div class="container py-5"><div class="alert alert-warning">{err.user_message()}</div></div>);
	}
	let submissions = mine.items();
	let active = assignments.items().into_iter().filter(|assignment| assignment.is_active).collect::<Vec<_>>();

	html! {
		<section class="container py-5">
			<h1 class="h3 mb-4">{"My Assignments"}</h1>
			{active.is_empty().then(|| html!(<p class="text-muted">{"No assignments right now."}</p>))}
			{for active.iter().map(|assignment| {
				let state = match progress(assignment, &submissions) {
					Progress::Pending => html! {
						<SubmitForm
							assignment_id={assignment.id.clone()}
							controller={assignments.clone()}
							on_done={reload.clone()}
						/>
					},
					Progress::Submitted(submission) => html! {
						<div class="d-flex align-items-center gap-2">
							<span class="badge bg-info text-dark">{"Submitted"}</span>
							<small class="text-muted">{util::format_date(submission.submitted_at)}</small>
							{download_button(Some(fetch_submission as FileFetch<Submission>), &submission.id, &mine, on_done.clone(), &services.config)}
						</div>
					},
					Progress::Graded(submission) => html! {
						<div>
							<span class="badge bg-success me-2">
								{format!("Grade: {}/{}", submission.grade.unwrap_or_default(), assignment.points)}
							</span>
							<span class="text-muted">{&submission.feedback}</span>
						</div>
					},
				};
				html! {
					<div class="card shadow-sm mb-3" key={assignment.id.clone()}>
						<div class="card-body">
							<div class="d-flex justify-content-between">
								<h5 class="card-title">{&assignment.title}</h5>
								<span class="text-muted">{format!("{} points", assignment.points)}</span>
							</div>
							<p class="card-text">{&assignment.description}</p>
							<p class="small text-muted">
								{format!("Due {}", assignment.due_date.as_deref().map(|due| due.chars().take(10).collect()).unwrap_or_else(|| "-".to_owned()))}
							</p>
							<div class="mb-3">
								{download_button(
									Some(fetch_file::<Assignment> as FileFetch<Assignment>).filter(|_| assignment.file.is_some()),
									&assignment.id,
									&assignments,
									on_done.clone(),
									&services.config,
								)}
							</div>
							{state}
						</div>
					</div>
				}
			})}
		</section>
	}
}

#[derive(Properties)]
struct SubmitFormProps {
	assignment_id: String,
	controller: Rc<Controller<Assignment>>,
	on_done: Callback<()>,
}

impl PartialEq for SubmitFormProps {
	fn eq(&self, other: &Self) -> bool {
		self.assignment_id == other.assignment_id && Rc::ptr_eq(&self.controller, &other.controller)
	}
}

#[function_component]
fn SubmitForm(props: &SubmitFormProps) -> Html {
	let services = use_services();
	let file = use_state(|| None::<Attachment>);
	let comment = use_state_eq(String::new);
	let busy = use_state_eq(|| false);
	let lifetime = services.config.toast_duration;

	let pick = {
		let file = file.clone();
		Callback::from(move |event: Event| {
			let Some(picked) = util::picked_file(&event) else {
				file.set(None);
				return;
			};
			let file = file.clone();
			util::spawn_local("ui", async move {
				file.set(Some(util::read_file(picked).await?));
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};
	let onsubmit = {
		let (file, comment, busy) = (file.clone(), comment.clone(), busy.clone());
		let controller = props.controller.clone();
		let id = props.assignment_id.clone();
		let on_done = props.on_done.clone();
		Callback::from(move |event: SubmitEvent| {
			event.prevent_default();
			let Some(attachment) = (*file).clone() else {
				return notify::failure("Error", &ApiError::from(ValidationError::FileRequired), lifetime);
			};
			busy.set(true);
			let (controller, id, comment, busy, on_done) =
				(controller.clone(), id.clone(), (*comment).clone(), busy.clone(), on_done.clone());
			util::spawn_local("ui", async move {
				let result = controller.submit(&id, attachment, &comment).await;
				busy.set(false);
				match result {
					Ok(_) => {
						notify::success("Assignment submitted", lifetime);
						on_done.emit(());
					}
					Err(err) => notify::failure("Submission failed", &err, lifetime),
				}
				Ok(()) as Result<(), anyhow::Error>
			});
		})
	};

	html! {
		<form class="row g-2 align-items-center" {onsubmit}>
			<div class="col-md-5">
				<input class="form-control form-control-sm" type="file" onchange={pick} />
			</div>
			<div class="col-md-5">
				<input class="form-control form-control-sm" placeholder="Comment (optional)" value={(*comment).clone()}
					oninput={{
						let comment = comment.clone();
						Callback::from(move |event: InputEvent| comment.set(util::input_value(&event)))
					}} />
			</div>
			<div class="col-md-2">
				<button type="submit" class="btn btn-sm btn-primary w-100" disabled={*busy}>{"Submit"}</button>
			</div>
		</form>
	}
}

/// Splits meetings into what is still ahead and what is over, each in start order.
pub fn schedule(meetings: Vec<ZoomMeeting>, now: OffsetDateTime) -> (Vec<(ZoomMeeting, MeetingStatus)>, Vec<(ZoomMeeting, MeetingStatus)>) {
	meetings
		.into_iter()
		.map(|meeting| {
			let status = meeting.status_at(now);
			(meeting, status)
		})
		.sorted_by_key(|(meeting, _)| meeting.starts_at())
		.partition(|(_, status)| matches!(status, MeetingStatus::Upcoming | MeetingStatus::Ongoing))
}

#[function_component]
pub fn ZoomSchedule() -> Html {
	let meetings = use_controller(Controller::<ZoomMeeting>::new);
	let load = use_async(true, {
		let meetings = meetings.clone();
		move || {
			let meetings = meetings.clone();
			Box::pin(async move { meetings.fetch_all().await })
		}
	});

	if load.loading {
		return html!(<Spinner />);
	}
	if let Some(err) = &load.error {
		return html!(<div class="container py-5"><div class="alert alert-warning">{err.user_message()}</div></div>);
	}
	let (ahead, past) = schedule(meetings.items(), OffsetDateTime::now_utc());
	let card = |(meeting, status): &(ZoomMeeting, MeetingStatus)| {
		let badge = match status {
			MeetingStatus::Ongoing => "badge bg-danger",
			MeetingStatus::Upcoming => "badge bg-primary",
			MeetingStatus::Completed => "badge bg-secondary",
			MeetingStatus::Cancelled => "badge bg-dark",
		};
		let joinable = matches!(status, MeetingStatus::Upcoming | MeetingStatus::Ongoing);
		html! {
			<div class="card shadow-sm mb-3" key={meeting.id.clone()}>
				<div class="card-body d-flex justify-content-between align-items-center">
					<div>
						<h5 class="card-title mb-1">{&meeting.title}<span class={classes!(badge, "ms-2")}>{status.label()}</span></h5>
						<p class="mb-1 text-muted">{meeting_time(meeting)}</p>
						<p class="mb-0">{&meeting.description}</p>
					</div>
					{joinable.then(|| html! {
						<a class="btn btn-primary" href={meeting.meeting_link.clone()} target="_blank" rel="noopener">
							<i class="bi bi-camera-video me-1" />{"Join Meeting"}
						</a>
					})}
				</div>
			</div>
		}
	};

	html! {
		<section class="container py-5">
			<h1 class="h3 mb-4">{"Zoom Schedule"}</h1>
			<h2 class="h5">{"Upcoming"}</h2>
			{ahead.is_empty().then(|| html!(<p class="text-muted">{"No upcoming meetings."}</p>))}
			{for ahead.iter().map(card)}
			<h2 class="h5 mt-5">{"Past"}</h2>
			{for past.iter().map(card)}
		</section>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use time::macros::datetime;

	fn meeting(id: &str, scheduled: &str, active: bool) -> ZoomMeeting {
		serde_json::from_value(json!({
			"_id": id,
			"title": id,
			"meetingLink": "https://zoom.us/j/1",
			"scheduledDate": scheduled,
			"isActive": active,
		}))
		.unwrap()
	}

	#[test]
	fn schedule_splits_and_orders() {
		let now = datetime!(2024-03-10 12:00 UTC);
		let (ahead, past) = schedule(
			vec![
				meeting("later", "2024-03-12T09:00:00Z", true),
				meeting("live", "2024-03-10T11:00:00Z", true),
				meeting("done", "2024-03-01T09:00:00Z", true),
				meeting("off", "2024-03-11T09:00:00Z", false),
			],
			now,
		);
		let ids = |list: &[(ZoomMeeting, MeetingStatus)]| list.iter().map(|(m, _)| m.id.clone()).collect::<Vec<_>>();
		assert_eq!(ids(&ahead), vec!["live", "later"]);
		assert_eq!(ahead[0].1, MeetingStatus::Ongoing);
		assert_eq!(ids(&past), vec!["done", "off"]);
	}

	#[test]
	fn progress_follows_own_submissions() {
		let assignment: Assignment = serde_json::from_value(json!({ "_id": "a1", "title": "Essay", "points": 100 })).unwrap();
		assert_eq!(progress(&assignment, &[]), Progress::Pending);
		let mut submission: Submission =
			serde_json::from_value(json!({ "_id": "s1", "assignment": { "_id": "a1", "title": "Essay" } })).unwrap();
		assert!(matches!(progress(&assignment, std::slice::from_ref(&submission)), Progress::Submitted(_)));
		submission.grade = Some(88);
		assert!(matches!(progress(&assignment, std::slice::from_ref(&submission)), Progress::Graded(_)));
		let other: Submission = serde_json::from_value(json!({ "_id": "s2", "assignment": "a2" })).unwrap();
		assert_eq!(progress(&assignment, &[other]), Progress::Pending);
	}

	#[test]
	fn meeting_time_reads_in_utc() {
		assert_eq!(meeting_time(&meeting("m", "2024-02-15T10:05", true)), "February 15, 2024 at 10:05 UTC");
		assert_eq!(meeting_time(&meeting("m", "soon", true)), "soon");
	}
}
