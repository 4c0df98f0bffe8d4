pub mod assignment;
pub mod cli;
pub mod config;
pub mod source;
