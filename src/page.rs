mod account;
pub use account::*;
mod catalog;
pub use catalog::*;
mod dashboard;
pub use dashboard::*;
mod drafts;
pub use drafts::*;
mod home;
pub use home::*;
mod manage;
pub use manage::*;
mod info;
pub use info::*;
mod student;
pub use student::*;
