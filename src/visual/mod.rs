pub mod markers;
pub mod plugin;
pub mod utils;
