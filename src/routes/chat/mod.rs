mod complete;
mod stream;

pub use complete::*;
pub use stream::*;
