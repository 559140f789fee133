pub mod event;
pub mod period;
pub mod time;

pub use event::*;
pub use period::*;
pub use time::*;
