//! Binary entry point for the `hwinv` tool.

use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use hardware_inventory::{Category, Options, SilentDiagnostics};
use hardware_inventory_cli::{OutputFormat, parse_category, render};

/// Prints the hardware inventory of a Linux host as JSON or YAML.
#[derive(FromArgs)]
struct Args {
    /// directory to read /proc and /sys from instead of the real root
    #[argh(option)]
    root: Option<PathBuf>,

    /// path of the pci.ids database to use instead of the well-known locations
    #[argh(option)]
    pci_ids: Option<PathBuf>,

    /// output format (json, yaml)
    #[argh(option, default = "OutputFormat::Json")]
    format: OutputFormat,

    /// indent JSON output
    #[argh(switch)]
    pretty: bool,

    /// do not log warnings about missing or malformed data
    #[argh(switch)]
    quiet: bool,

    /// the category to take inventory of (cpu, topology, pci, gpu, block)
    #[argh(positional, from_str_fn(parse_category))]
    category: Category,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let mut options = Options::from_env();

    if args.quiet {
        options = options.with_diagnostics(SilentDiagnostics::default());
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(root) = args.root {
        options = options.with_root(root);
    }

    if let Some(path) = args.pci_ids {
        options = options.with_pci_ids_path(path);
    }

    match render(args.category, args.format, args.pretty, &options) {
        Ok(document) => {
            // YAML already ends with a newline, JSON does not.
            println!("{}", document.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
