/*!
`run.rs` - single-shot invocation, built for scripting.

`run <target>` lists the server's tools. `run <target> <tool> [args...]`
invokes one tool: trailing arguments become the payload (query-style pairs or
a JSON5 object); without them the payload is read from stdin to end-of-stream.
Exit codes are stable so scripts can branch: 0 success, 2 usage, 3
connect/list, 4 tool execution.
*/

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncReadExt;

use crate::cmd::{EXIT_CONNECT, EXIT_OK, EXIT_TOOL, EXIT_USAGE, runner_exit_code};
use crate::cmd::parse;
use crate::log_debug;
use crate::runner::McpRunner;
use crate::tools;
use crate::transport;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Target MCP server (quote multi-word stdio commands)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Tool to invoke; omit to list the available tools
    #[arg(value_name = "TOOL")]
    pub tool: Option<String>,

    /// Payload as key=value pairs or a JSON5 object (stdin is read when omitted)
    #[arg(value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Print the tool listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_run(args: RunArgs) -> Result<i32> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run_single_shot(args))
}

async fn run_single_shot(args: RunArgs) -> Result<i32> {
    let target = match transport::classify(&args.target) {
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

    let tools = match tools::list_tools(runner.client()).await {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("Failed to list tools: {e:#}");
            runner.shutdown().await;
            return Ok(EXIT_CONNECT);
        }
    };

    let Some(tool_name) = args.tool else {
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
            );
        } else {
            for tool in &tools {
                println!("{}", tools::format_tool(tool));
            }
        }
        runner.shutdown().await;
        return Ok(EXIT_OK);
    };

    if !tools::validate_tool_name(&tools, &tool_name) {
        eprintln!("Tool not found: {tool_name}");
        runner.shutdown().await;
        return Ok(EXIT_CONNECT);
    }

    let payload = if args.args.is_empty() {
        log_debug!("no payload arguments; reading stdin");
        let mut payload_text = String::new();
        if let Err(e) = tokio::io::stdin().read_to_string(&mut payload_text).await {
            eprintln!("Failed to read stdin: {e}");
            runner.shutdown().await;
            return Ok(EXIT_USAGE);
        }
        parse::parse_payload(&payload_text, true)
    } else {
        parse::parse_payload_args(&args.args, true)
    };

    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("{e}");
            runner.shutdown().await;
            return Ok(EXIT_USAGE);
        }
    };

    match tools::call_tool(runner.client(), &tool_name, payload).await {
        Ok(result) => {
            let value = serde_json::to_value(&result).unwrap_or(serde_json::Value::Null);
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            );
            runner.shutdown().await;
            Ok(EXIT_OK)
        }
        Err(e) => {
            eprintln!("Tool execution failed: {e:#}");
            runner.shutdown().await;
            Ok(EXIT_TOOL)
        }
    }
}
