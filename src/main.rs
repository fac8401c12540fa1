// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! keel - load a module graph and report what the loader did
//!
//! Resolves an entry module and everything it statically imports, then
//! prints each module with its imports and exports.

use anyhow::Context;
use clap::Parser;
use keel_engine::{ModuleGraph, Runtime, ScriptError};
use keel_modules::LoaderConfig;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(author, version = keel_modules::VERSION, about, long_about = None)]
struct Cli {
    /// Entry module path
    entry: String,

    /// Load the graph in this many realms
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    realms: u32,

    /// Use joined paths verbatim instead of canonicalizing them
    #[arg(long)]
    no_canonicalize: bool,

    /// Report missing modules as `Error: Cannot find module` instead of a SyntaxError
    #[arg(long)]
    strict_errors: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", e.kind.name().red().bold(), e.message);
            ExitCode::FAILURE
        }
    }
}

/// Configuration files and environment, then command line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<LoaderConfig> {
    let mut config = LoaderConfig::load().context("Failed to load configuration")?;
    if cli.no_canonicalize {
        config.canonicalize = false;
    }
    if cli.strict_errors {
        config.missing_module_as_syntax_error = false;
    }
    Ok(config)
}

fn run(cli: &Cli, config: LoaderConfig) -> Result<(), ScriptError> {
    let mut runtime = Runtime::new(config);

    let graph = runtime.load_entry(&cli.entry)?;
    print_graph(&runtime, &graph);

    let mut extra_realms = Vec::new();
    for _ in 1..cli.realms {
        let realm = runtime.enter_new_realm()?;
        let graph = runtime.load_entry(&cli.entry)?;
        info!("Loaded {} module(s) in {}", graph.len(), realm);
        extra_realms.push(realm);
    }

    if !extra_realms.is_empty() {
        println!();
        println!(
            "{} {} module(s) across {} realm(s)",
            "Cached".green().bold(),
            runtime.cached_module_count(),
            cli.realms
        );
        for realm in &extra_realms {
            let released = runtime.destroy_realm(realm)?;
            println!(
                "{} {} module(s) from {}",
                "Released".yellow().bold(),
                released,
                realm.dimmed()
            );
        }
    }

    println!();
    println!(
        "{} {} module(s) cached, {} parse(s)",
        "Done".green().bold(),
        runtime.cached_module_count(),
        runtime.engine().parse_count()
    );
    Ok(())
}

fn print_graph<P: keel_modules::Platform>(runtime: &Runtime<P>, graph: &ModuleGraph) {
    for module in &graph.modules {
        let path = runtime
            .module_path(module)
            .unwrap_or_else(|| module.to_string());
        println!("{}", path.cyan().bold());

        if let Some(data) = module.as_module() {
            if !data.syntax.imports.is_empty() {
                println!("  {} {}", "imports".dimmed(), data.syntax.imports.join(", "));
            }
            if !data.syntax.exports.is_empty() {
                println!("  {} {}", "exports".dimmed(), data.syntax.exports.join(", "));
            }
        }
    }
}
