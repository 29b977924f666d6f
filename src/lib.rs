// Library exports for the terminal driver and tests
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod prefs;
pub mod services;
pub mod store;
pub mod tasks;
pub mod ui;
