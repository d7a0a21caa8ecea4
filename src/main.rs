use clap::{Parser, Subcommand};

mod cmd;
mod runner;
mod schema;
mod tools;
mod transport;
mod utils;

use cmd::{ConnectArgs, RunArgs};

/// climcp - simple MCP connector CLI
///
/// Commands:
///   climcp connect <target...>              Interactive session against an MCP server
///   climcp run <target> [tool] [args...]    Single-shot tool invocation
///
/// Targets:
///   Local command (spawned):   "npx -y @modelcontextprotocol/server-everything"
///   Streamable HTTP URL:       https://host/mcp
///   SSE URL (deprecated):      sse://host/sse, sse+https://host/sse
///
/// Payloads:
///   JSON5 object literal:      { path: '.', recursive: true }
///   Query-style pairs:         path=. recursive=true user.name="Jo Doe"
///
/// Global flags:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///
/// Examples:
///   climcp connect npx -y @modelcontextprotocol/server-filesystem .
///   climcp run "npx -y @modelcontextprotocol/server-filesystem ." list_directory path=.
///   echo '{ path: "." }' | climcp run "npx -y @modelcontextprotocol/server-filesystem ." list_directory
#[derive(Parser, Debug)]
#[command(
    name = "climcp",
    version,
    about = "Simple MCP connector CLI",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open an interactive session against an MCP server
    Connect(ConnectArgs),

    /// Invoke one tool (or list tools) and exit
    Run(RunArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let result = match cli.command {
        Commands::Connect(args) => cmd::execute_connect(args),
        Commands::Run(args) => cmd::execute_run(args),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            cmd::EXIT_USAGE
        }
    };
    std::process::exit(code);
}
