#[tokio::main]
async fn main() {
    if let Err(err) = app::run().await {
        eprintln!("fatal: {err}");
        std::process::exit(1);
    }
}

mod api;
mod app;
mod auth;
mod dto;
mod error;
mod models;
mod repositories;
mod telemetry;
mod usecases;
