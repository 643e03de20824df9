pub mod clipboard;
pub mod config;
pub mod output;
pub mod rating;
pub mod scoring;
pub mod stderr_buffer;
pub mod storage;
pub mod tui;
