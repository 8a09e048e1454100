pub mod config;
pub mod diff;
pub mod feed;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod state;
