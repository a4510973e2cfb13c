pub mod classify;
pub mod config;
pub mod quality;
pub mod replay;
