pub mod atomic;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod fs;
pub mod inspect;
pub mod output;
pub mod refs;
pub mod spec;
