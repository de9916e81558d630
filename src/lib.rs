pub mod api;
pub mod command;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod fsio;
pub mod state;
pub mod status;
