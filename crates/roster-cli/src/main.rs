// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use logging::LogConfig;
use roster_app::{ClientRecord, RosterCounts, RosterView, ViewMode};
use roster_tui::RosterRuntime;
use runtime::DemoRuntime;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `roster --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let seed = options.seed.unwrap_or_else(|| config.seed());
    let client_count = options.client_count.unwrap_or_else(|| config.client_count());
    let view_mode = options.view_mode.unwrap_or_else(|| config.default_view());
    let log_file = config.log_file()?;

    let mut runtime = DemoRuntime::new(seed, client_count, OffsetDateTime::now_utc());
    let mut view = RosterView::new(view_mode);

    if options.dump_json {
        let dump = RosterDump::new(&view, runtime.clients());
        println!(
            "{}",
            serde_json::to_string_pretty(&dump).context("encode roster as JSON")?
        );
        return Ok(());
    }

    if options.check_only {
        println!(
            "config ok: {} clients (seed {seed}), {} view, logging to {}",
            runtime.clients().len(),
            view_mode.as_str(),
            log_file.display()
        );
        return Ok(());
    }

    logging::init_logging(&LogConfig {
        level: config.log_level(),
        log_file,
    })?;
    tracing::info!(seed, clients = client_count, view = view_mode.as_str(), "roster starting");
    roster_tui::run_app(&mut view, &mut runtime)
}

/// What `--dump-json` prints: the rows as the chosen view would show them.
#[derive(Debug, Serialize)]
struct RosterDump<'a> {
    view_mode: ViewMode,
    counts: RosterCounts,
    visible: usize,
    clients: Vec<&'a ClientRecord>,
}

impl<'a> RosterDump<'a> {
    fn new(view: &RosterView, clients: &'a [ClientRecord]) -> Self {
        let rows = view.rows(clients);
        Self {
            view_mode: view.view_mode(),
            counts: view.counts(clients),
            visible: rows.len(),
            clients: rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    dump_json: bool,
    seed: Option<u64>,
    client_count: Option<usize>,
    view_mode: Option<ViewMode>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        dump_json: false,
        seed: None,
        client_count: None,
        view_mode: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--seed requires a number"))?;
                let seed = value
                    .as_ref()
                    .parse()
                    .with_context(|| format!("invalid --seed {:?}", value.as_ref()))?;
                options.seed = Some(seed);
            }
            "--clients" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--clients requires a count"))?;
                let count: usize = value
                    .as_ref()
                    .parse()
                    .with_context(|| format!("invalid --clients {:?}", value.as_ref()))?;
                if count == 0 {
                    return Err(anyhow!("--clients must be at least 1"));
                }
                options.client_count = Some(count);
            }
            "--view" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--view requires card, list, or table"))?;
                let mode = ViewMode::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown view {:?}; use card, list, or table",
                        value.as_ref()
                    )
                })?;
                options.view_mode = Some(mode);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--dump-json" => {
                options.dump_json = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("roster");
    println!("  --config <path>          Use a specific config path");
    println!("  --seed <n>               Seed for the demo roster");
    println!("  --clients <n>            Number of demo clients");
    println!("  --view <mode>            Start in card, list, or table view");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --dump-json              Print the projected roster as JSON and exit");
    println!("  --check                  Validate config and startup, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, RosterDump, parse_cli_args};
    use anyhow::Result;
    use roster_app::{RosterCommand, RosterView, TypeFilter, ViewMode};
    use roster_testkit::sample_roster;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/roster-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                dump_json: false,
                seed: None,
                client_count: None,
                view_mode: None,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_demo_overrides() -> Result<()> {
        let options = parse_cli_args(
            vec!["--seed", "9", "--clients", "25", "--view", "table", "--dump-json"],
            default_options_path(),
        )?;
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.client_count, Some(25));
        assert_eq!(options.view_mode, Some(ViewMode::Table));
        assert!(options.dump_json);
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for flag in ["--config", "--seed", "--clients", "--view"] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().starts_with(flag), "{flag}: {error}");
        }
    }

    #[test]
    fn parse_cli_args_rejects_bad_values() {
        let seed = parse_cli_args(vec!["--seed", "abc"], default_options_path())
            .expect_err("non-numeric seed should fail");
        assert!(seed.to_string().contains("invalid --seed"));

        let zero = parse_cli_args(vec!["--clients", "0"], default_options_path())
            .expect_err("zero clients should fail");
        assert!(zero.to_string().contains("at least 1"));

        let view = parse_cli_args(vec!["--view", "grid"], default_options_path())
            .expect_err("unknown view should fail");
        assert!(view.to_string().contains("card, list, or table"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check", "-h"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.show_help);
        assert!(!options.dump_json);
        Ok(())
    }

    #[test]
    fn dump_uses_iso_dates_and_projected_order() -> Result<()> {
        let clients = sample_roster();
        let mut view = RosterView::new(ViewMode::List);
        view.dispatch(&clients, RosterCommand::SetTypeFilter(TypeFilter::Individual))?;

        let value = serde_json::to_value(RosterDump::new(&view, &clients))?;
        assert_eq!(value["view_mode"], "List");
        assert_eq!(value["visible"], 3);
        assert_eq!(value["counts"]["all"], 4);
        assert_eq!(value["clients"][0]["name"], "Ann Lee");
        let created = value["clients"][0]["created_date"]
            .as_str()
            .unwrap_or_default();
        assert_eq!(created, "2025-12-16");
        Ok(())
    }
}
