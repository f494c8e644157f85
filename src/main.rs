mod cli;
mod commands;
mod config;
mod offline;
mod provider;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use provider::Provider;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub json: bool,
    pub offline: bool,
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        json: cli.json,
        offline: cli.offline,
        config: cli.config,
    };
    log::trace!("verbosity {}", ctx.verbose);

    let provider = Provider::new();

    match cli.command {
        Command::ListTypes => commands::schema::list_types(&ctx, &provider),
        Command::Schema {
            type_name,
            data_source,
        } => commands::schema::show(&ctx, &provider, type_name.as_deref(), data_source),
        Command::Create { type_name, input } => {
            commands::resource::create(&ctx, &provider, &type_name, &input)
        }
        Command::Read { type_name, id } => commands::resource::read(&ctx, &provider, &type_name, &id),
        Command::Update {
            type_name,
            id,
            input,
        } => commands::resource::update(&ctx, &provider, &type_name, &id, &input),
        Command::Delete { type_name, id } => {
            commands::resource::delete(&ctx, &provider, &type_name, &id)
        }
        Command::Import {
            type_name,
            ids,
            jobs,
        } => commands::resource::import(&ctx, &provider, &type_name, &ids, jobs),
        Command::Lookup { type_name, id } => {
            commands::resource::lookup(&ctx, &provider, &type_name, &id)
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "owrt", &mut io::stdout());
            Ok(())
        }
    }
}
