pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::path::Path;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::engine::LoadRequest;
use crate::services::import::ImportService;
use crate::services::report::ReportService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_import(file: &Path) -> Result<()> {
    let config = AppConfig::new();
    let service = ImportService::from_path(&config.server.database_path)?;
    service.run(file).map(|_| ())
}

pub fn handle_report(
    season: &str,
    regions: Option<&str>,
    overlays: Option<&str>,
    now: Option<i64>,
    json: bool,
) -> Result<()> {
    let request = LoadRequest::parse(season, regions, overlays, None)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ReportService::new(services::build_engine(&config)?);
        service.run(&request, now, json).await
    })
}

pub fn handle_completions(shell: clap_complete::Shell) -> Result<()> {
    cli::print_completions(shell);
    Ok(())
}
