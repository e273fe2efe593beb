//! hbiflash - Vproc voice-processor programmer
//!
//! A host-side tool for configuring and reprogramming HBI-attached
//! voice-processing devices: register access, firmware/configuration image
//! loading, flash save/erase, grammar loading, and the offline image
//! converter.
//!
//! All protocol logic lives in `hbiflash-core`; this binary is a thin
//! wrapper that opens a port, dispatches one operation and reports the
//! outcome.

mod cli;
mod commands;
mod ports;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Read {
            port,
            address,
            count,
        } => ports::with_port(&port, |p| commands::read::run(p, address, count)),
        Commands::Write {
            port,
            address,
            values,
        } => ports::with_port(&port, |p| commands::write::run(p, address, &values)),
        Commands::Load {
            port,
            input,
            save,
            start,
        } => ports::with_port(&port, |p| commands::load::run(p, &input, save, start)),
        Commands::Start { port } => ports::with_port(&port, commands::flash::run_start),
        Commands::Save { port } => ports::with_port(&port, commands::flash::run_save),
        Commands::Erase { port } => ports::with_port(&port, commands::flash::run_erase),
        Commands::Grammar { port, input } => {
            ports::with_port(&port, |p| commands::grammar::run(p, &input))
        }
        Commands::Convert {
            input,
            output,
            block_size,
            device_code,
        } => commands::convert::run(&input, &output, block_size, device_code),
        Commands::PackGrammar {
            trigger,
            command,
            output,
            description,
            version,
        } => commands::convert::run_pack_grammar(
            trigger.as_deref(),
            command.as_deref(),
            &output,
            &description,
            version,
        ),
        Commands::ListPorts => {
            ports::list_ports();
            Ok(())
        }
    }
}
