#![deny(warnings)]
pub mod bot;
pub mod convention;
pub mod session;

pub use bot::take_action;
pub use convention::{Convention, stall_severity};
pub use session::{Note, Session};
