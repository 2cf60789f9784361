#[cfg(target_family = "wasm")]
pub mod wasm {
	use log::{LevelFilter, Log, Metadata, Record};

	#[derive(Debug, Clone, Copy)]
	pub struct Config {
		level: LevelFilter,
		prefer_target: bool,
	}

	impl Default for Config {
		fn default() -> Self {
			Self {
				level: if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info },
				prefer_target: false,
			}
		}
	}

	impl Config {
		pub fn with_level(mut self, level: LevelFilter) -> Self {
			self.level = level;
			self
		}

		/// Prefix each line with the record's target instead of its module path.
		pub fn prefer_target(mut self) -> Self {
			self.prefer_target = true;
			self
		}
	}

	struct ConsoleLogger(Config);

	impl Log for ConsoleLogger {
		fn enabled(&self, metadata: &Metadata) -> bool {
			metadata.level() <= self.0.level
		}

		fn log(&self, record: &Record) {
			if !self.enabled(record.metadata()) {
				return;
			}
			let origin = match (self.0.prefer_target, record.module_path()) {
				(false, Some(module)) => module,
				_ => record.target(),
			};
			let line = wasm_bindgen::JsValue::from(format!("[{origin}] {}", record.args()));
			match record.level() {
				log::Level::Error => web_sys::console::error_1(&line),
				log::Level::Warn => web_sys::console::warn_1(&line),
				log::Level::Info => web_sys::console::info_1(&line),
				log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
			}
		}

		fn flush(&self) {}
	}

	pub fn init(config: Config) {
		let level = config.level;
		if log::set_boxed_logger(Box::new(ConsoleLogger(config))).is_ok() {
			log::set_max_level(level);
		}
	}
}

#[cfg(not(target_family = "wasm"))]
pub mod native {
	use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

	pub fn init(level: LevelFilter) {
		let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);
	}

	#[cfg(test)]
	pub fn init_for_tests() {
		let _ = simplelog::TestLogger::init(LevelFilter::Debug, Config::default());
	}
}
