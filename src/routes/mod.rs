pub(crate) mod browse;
pub(crate) mod chat;
pub(crate) mod conversation;
pub mod health_checks;
pub(crate) mod telegram;

pub use browse::*;
pub use health_checks::*;
