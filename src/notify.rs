//! Transient toasts shown in the corner of every page.

use crate::api::ApiError;
use std::time::Duration;
use yewdux::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
	Success,
	Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
	pub id: usize,
	pub kind: ToastKind,
	pub title: String,
	pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Store)]
pub struct Notifications {
	next_id: usize,
	toasts: Vec<Toast>,
}

impl Notifications {
	pub fn toasts(&self) -> &[Toast] {
		&self.toasts
	}

	pub fn push(&mut self, kind: ToastKind, title: impl Into<String>, message: Option<String>) -> usize {
		let id = self.next_id;
		self.next_id += 1;
		self.toasts.push(Toast { id, kind, title: title.into(), message });
		id
	}

	pub fn dismiss(&mut self, id: usize) {
		self.toasts.retain(|toast| toast.id != id);
	}
}

fn show(kind: ToastKind, title: String, message: Option<String>, lifetime: Duration) {
	let dispatch = Dispatch::<Notifications>::new();
	let mut id = 0;
	dispatch.reduce_mut(|notifications| id = notifications.push(kind, title, message));
	let millis = u32::try_from(lifetime.as_millis()).unwrap_or(u32::MAX);
	gloo_timers::callback::Timeout::new(millis, move || {
		Dispatch::<Notifications>::new().reduce_mut(|notifications| notifications.dismiss(id));
	})
	.forget();
}

pub fn success(title: impl Into<String>, lifetime: Duration) {
	show(ToastKind::Success, title.into(), None, lifetime);
}

/// Reports a failure caught at the view boundary.
pub fn failure(title: impl Into<String>, err: &ApiError, lifetime: Duration) {
	let title = title.into();
	log::warn!(target: "ui", "{title}: {err}");
	show(ToastKind::Error, title, Some(err.user_message()), lifetime);
}

/// Reports a local failure that never reached the API.
pub fn error(title: impl Into<String>, detail: impl std::fmt::Display, lifetime: Duration) {
	let title = title.into();
	log::warn!(target: "ui", "{title}: {detail}");
	show(ToastKind::Error, title, Some(detail.to_string()), lifetime);
}
