mod crud;
mod messages;

pub use crud::*;
pub use messages::*;
