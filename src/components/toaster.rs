use crate::notify::{Notifications, ToastKind};
use yew::prelude::*;
use yewdux::prelude::*;

#[function_component]
pub fn Toaster() -> Html {
	let (notifications, dispatch) = use_store::<Notifications>();
	let toasts = notifications.toasts().iter().map(|toast| {
		let id = toast.id;
		let dismiss = dispatch.reduce_mut_callback(move |notifications| notifications.dismiss(id));
		let class = match toast.kind {
			ToastKind::Success => "toast show border-success",
			ToastKind::Error => "toast show border-danger",
		};
		html! {
			<div {class} role="alert" key={id}>
				<div class="toast-header">
					<strong class="me-auto">{&toast.title}</strong>
					<button type="button" class="btn-close" onclick={dismiss} />
				</div>
				{toast.message.as_ref().map(|message| html!(<div class="toast-body">{message}</div>))}
			</div>
		}
	});
	html! {
		<div class="toast-container position-fixed bottom-0 end-0 p-3">
			{for toasts}
		</div>
	}
}
