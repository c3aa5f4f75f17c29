pub mod cli;
pub mod config;
pub mod controller;
pub mod core;
pub mod exit;
pub mod logs;
pub mod platform;
pub mod transport;
pub mod tui;
pub mod ui;
pub mod view;
pub mod visual;
