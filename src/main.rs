#[cfg(target_family = "wasm")]
fn main() {
	use excellence_web::logging::wasm::{init, Config};
	init(Config::default().prefer_target());
	yew::Renderer::<excellence_web::App>::new().render();
}

#[cfg(not(target_family = "wasm"))]
fn main() {
	excellence_web::logging::native::init(log::LevelFilter::Info);
	log::error!(target: "app", "excellence-web only runs in the browser; build it for wasm32-unknown-unknown");
}
