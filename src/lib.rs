pub mod calendar;
pub mod config;
pub mod controller;
pub mod dates;
pub mod logging;
pub mod notes;
pub mod storage;
pub mod ui;
