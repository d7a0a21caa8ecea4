/*!
`connect.rs` - the interactive session.

Connect, list the server's tools, then prompt in a loop. Each line is either
a built-in (`/q`, `/t`, `/h`) or a tool invocation; commands run strictly one
at a time - the next line is not read until the current call resolves. Every
way out of the loop (quit command, end of input, interrupt) drains through
the runner's idempotent shutdown.
*/

use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashSet;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cmd::{EXIT_CONNECT, EXIT_OK, EXIT_USAGE, runner_exit_code};
use crate::cmd::parse;
use crate::runner::McpRunner;
use crate::tools;
use crate::transport;

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Target MCP server: a command line to spawn, or an http(s):// / sse:// URL
    #[arg(
        value_name = "TARGET",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub target: Vec<String>,
}

pub fn execute_connect(args: ConnectArgs) -> Result<i32> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run_interactive(args))
}

async fn run_interactive(args: ConnectArgs) -> Result<i32> {
    let target = match transport::classify_argv(&args.target) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Invalid target: {e:#}");
            return Ok(EXIT_USAGE);
        }
    };

    let mut runner = match McpRunner::connect(target).await {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("{e}");
            return Ok(runner_exit_code(&e));
        }
    };

    let mut tool_names = match print_tool_listing(&runner).await {
        Ok(names) => names,
        Err(e) => {
            eprintln!("Failed to list tools: {e:#}");
            runner.shutdown().await;
            return Ok(EXIT_CONNECT);
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    eprintln!("Failed to read input: {e}");
                    break;
                }
            },
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            "/q" | "/quit" => break,
            "/t" | "/tools" => {
                match print_tool_listing(&runner).await {
                    // the fresh snapshot wins
                    Ok(names) => tool_names = names,
                    Err(e) => eprintln!("Failed to list tools: {e:#}"),
                }
                continue;
            }
            "/h" | "/help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        let invocation = match parse::parse_invocation(trimmed) {
            Ok(invocation) => invocation,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if !tool_names.contains(&invocation.tool_name) {
            eprintln!("Tool not found: {}", invocation.tool_name);
            continue;
        }

        let payload = match parse::parse_payload(&invocation.payload_text, true) {
            Ok(payload) => payload,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match tools::call_tool(runner.client(), &invocation.tool_name, payload).await {
            Ok(result) => println!("{}", tools::format_call_result(&result)),
            Err(e) => eprintln!("Tool call failed: {e:#}"),
        }
    }

    runner.shutdown().await;
    Ok(EXIT_OK)
}

/// List tools, print the listing, and return the set of known names.
async fn print_tool_listing(runner: &McpRunner) -> Result<HashSet<String>> {
    let tools = tools::list_tools(runner.client()).await?;
    for tool in &tools {
        println!("{}", tools::format_tool(tool));
    }
    Ok(tools.into_iter().map(|tool| tool.name).collect())
}

fn print_help() {
    println!("Commands:");
    println!("  /t, /tools   List available tools");
    println!("  /h, /help    Show this help");
    println!("  /q, /quit    Exit");
    println!();
    println!("Invoke a tool:  <tool-name> [payload]");
    println!("  payload may be a JSON5 object ({{ path: '.' }})");
    println!("  or key=value pairs (path=. recursive=true user.name=\"Jo Doe\")");
}
