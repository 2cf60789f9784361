mod auth_switch;
pub use auth_switch::*;
mod editor;
pub use editor::*;
mod guard;
pub use guard::*;
mod header;
pub use header::*;
mod toaster;
pub use toaster::*;
pub mod user;
