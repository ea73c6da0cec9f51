//! deskctrl — contract-driven desktop automation from the command line.
//!
//! Validate a locator contract, inspect live windows, and run the resolver
//! tools (find / invoke / set-value / tree / resolve / check) against the
//! Windows UIA provider. Every tool prints a structured JSON result; a
//! failed result sets the exit code but never tears the process down
//! mid-batch.

mod tools;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use deskctrl_core::{load_contract, validate, ActionResult, Limits};

#[derive(Parser)]
#[command(name = "deskctrl", about = "Contract-driven Windows desktop automation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a locator contract file (JSON or YAML).
    Validate {
        #[arg(long)]
        contract: PathBuf,
    },
    /// List live top-level windows.
    Windows {
        /// Filter to a known app id (e.g. "notepad").
        #[arg(long)]
        app: Option<String>,
    },
    /// Resolve a window by title regex.
    ResolveWindow {
        #[arg(long)]
        window: String,
    },
    /// Find elements matching a selector inside a window.
    Find {
        #[arg(long)]
        window: String,
        /// Selector string, e.g. "name=Save;controlType=button".
        #[arg(long)]
        selector: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Invoke a uniquely resolved element.
    Invoke {
        #[arg(long)]
        window: String,
        #[arg(long)]
        selector: String,
    },
    /// Set the value of a uniquely resolved element.
    SetValue {
        #[arg(long)]
        window: String,
        #[arg(long)]
        selector: String,
        #[arg(long)]
        value: String,
    },
    /// Dump a bounded snapshot of a window's control tree.
    Tree {
        #[arg(long)]
        window: String,
        #[arg(long, default_value_t = 6)]
        depth: usize,
        #[arg(long, default_value_t = 80)]
        max_children: usize,
    },
    /// Resolve a contract control through the UIA → OCR → offset chain.
    Resolve {
        #[arg(long)]
        contract: PathBuf,
        #[arg(long)]
        control: String,
    },
    /// Evaluate a contract assertion.
    Check {
        #[arg(long)]
        contract: PathBuf,
        #[arg(long)]
        assertion: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<bool> {
    let limits = Limits::default();
    match command {
        Command::Validate { contract } => {
            let doc = load_contract(&contract)?;
            let report = validate(&doc, &limits);
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            for error in &report.errors {
                println!("error: {error}");
            }
            if report.is_valid() {
                println!(
                    "contract {} is valid ({} windows, {} controls)",
                    contract.display(),
                    doc.windows.len(),
                    doc.controls.len()
                );
            }
            Ok(report.is_valid())
        }
        Command::Windows { app } => {
            let windows = tools::list_windows(app)?;
            print_json(&windows)?;
            Ok(true)
        }
        Command::ResolveWindow { window } => {
            print_result(tools::find_window(window, limits))
        }
        Command::Find { window, selector, limit } => {
            print_result(tools::find_elements(window, selector, limit, limits))
        }
        Command::Invoke { window, selector } => {
            print_result(tools::invoke(window, selector, limits))
        }
        Command::SetValue { window, selector, value } => {
            print_result(tools::set_value(window, selector, value, limits))
        }
        Command::Tree { window, depth, max_children } => {
            match tools::tree(window, depth, max_children, limits)? {
                Ok(tree) => {
                    print_json(&tree)?;
                    Ok(true)
                }
                Err(failure) => print_result(failure),
            }
        }
        Command::Resolve { contract, control } => {
            let report = tools::resolve(contract, control, limits)?;
            let success = report.success;
            print_json(&report)?;
            Ok(success)
        }
        Command::Check { contract, assertion } => print_result(tools::check(contract, assertion)?),
    }
}

fn print_result(result: ActionResult) -> Result<bool> {
    let success = result.success;
    print_json(&result)?;
    Ok(success)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
