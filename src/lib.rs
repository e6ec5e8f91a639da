//! Bureau：以終端機介面管理辦公室、部門與 webhook 代理，並從代理卡片觸發派送。

pub mod agent;
pub mod app;
pub mod config;
pub mod definitions;
pub mod event;
pub mod logging;
pub mod panels;
pub mod store;
pub mod tui;
pub mod ui;
