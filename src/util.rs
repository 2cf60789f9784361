use crate::{
	api::{Attachment, Download},
	resource::Confirm,
};
use anyhow::anyhow;
use gloo_file::{futures::read_as_bytes, Blob, File, ObjectUrl};
use wasm_bindgen::JsCast;

pub fn spawn_local<F, E>(target: &'static str, future: F)
where
	F: futures_util::Future<Output = Result<(), E>> + 'static,
	E: std::fmt::Debug + 'static,
{
	wasm_bindgen_futures::spawn_local(async move {
		if let Err(err) = future.await {
			log::error!(target: target, "{err:?}");
		}
	});
}

/// Asks through the browser's own confirmation dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserConfirm;

impl Confirm for BrowserConfirm {
	fn confirm(&self, prompt: &str) -> bool {
		gloo_utils::window().confirm_with_message(prompt).unwrap_or(false)
	}
}

/// File name and content type the browser saves a download under.
fn saved_as<'a>(download: &'a Download, fallback_name: &'a str) -> (&'a str, &'a str) {
	let name = download.file_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(fallback_name);
	let mime = download.mime.as_deref().filter(|mime| !mime.is_empty()).unwrap_or("application/octet-stream");
	(name, mime)
}

/// Hands downloaded bytes to the browser as a file save.
pub fn save_file(download: &Download, fallback_name: &str) -> anyhow::Result<()> {
	let (name, mime) = saved_as(download, fallback_name);
	let blob = Blob::new_with_options(download.bytes.as_slice(), Some(mime));
	// revoked when dropped at the end of this call
	let url = ObjectUrl::from(blob);
	let anchor = gloo_utils::document()
		.create_element("a")
		.map_err(|err| anyhow!("{err:?}"))?
		.dyn_into::<web_sys::HtmlAnchorElement>()
		.map_err(|err| anyhow!("{err:?}"))?;
	anchor.set_href(&url);
	anchor.set_download(name);
	anchor.click();
	log::debug!(target: "ui", "saved {name} ({} bytes)", download.bytes.len());
	Ok(())
}

/// Reads a picked file fully into memory.
pub async fn read_file(file: web_sys::File) -> anyhow::Result<Attachment> {
	let file = File::from(file);
	let bytes = read_as_bytes(&file).await.map_err(|err| anyhow!("failed to read {}: {err:?}", file.name()))?;
	Ok(Attachment { file_name: file.name(), mime: file.raw_mime_type(), bytes })
}

/// First file of a file input's change event.
pub fn picked_file(event: &yew::Event) -> Option<web_sys::File> {
	let input = event.target()?.dyn_into::<web_sys::HtmlInputElement>().ok()?;
	input.files()?.get(0)
}

pub fn input_value(event: &yew::Event) -> String {
	let Some(target) = event.target() else {
		return String::new();
	};
	if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
		return match input.type_().as_str() {
			"checkbox" => input.checked().to_string(),
			_ => input.value(),
		};
	}
	if let Some(area) = target.dyn_ref::<web_sys::HtmlTextAreaElement>() {
		return area.value();
	}
	if let Some(select) = target.dyn_ref::<web_sys::HtmlSelectElement>() {
		return select.value();
	}
	String::new()
}

pub fn format_size(bytes: u64) -> String {
	const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
	let mut size = bytes as f64;
	let mut unit = 0;
	while size >= 1024.0 && unit < UNITS.len() - 1 {
		size /= 1024.0;
		unit += 1;
	}
	match unit {
		0 => format!("{bytes} B"),
		_ => format!("{size:.1} {}", UNITS[unit]),
	}
}

pub fn format_date(at: Option<time::OffsetDateTime>) -> String {
	let Some(at) = at else {
		return String::new();
	};
	format!("{} {}, {}", at.month(), at.day(), at.year())
}
