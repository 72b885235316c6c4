pub mod net;
pub mod signal;
pub mod time;
