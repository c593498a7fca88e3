#![allow(warnings)]
//! Inventory Console Frontend Entry Point

mod api;
mod config;
mod context;
mod entities;
mod error;
mod forms;
mod hooks;
mod models;
mod notify;
mod query;
mod services;
mod session;
mod store;
mod table;
mod components;
mod app;

use app::App;
use leptos::prelude::*;
use log::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = rolling_logger::init_logger("inventory-console", LevelFilter::Info) {
        web_sys::console::error_1(&format!("Logger already initialised: {}", e).into());
    }
    log::info!("Starting inventory console");
    mount_to_body(App);
}
