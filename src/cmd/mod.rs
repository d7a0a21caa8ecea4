/*!
Command dispatcher module: one file per subcommand plus the shared parsers.

Conventions:
  - Each subcommand module exposes one `execute_*` function that builds its
    own runtime and returns the process exit code.
  - Exit codes are a fixed enumeration so scripts can branch on the failure
    class.
*/

pub mod connect;
pub mod parse;
pub mod run;

pub use connect::{ConnectArgs, execute_connect};
pub use run::{RunArgs, execute_run};

use crate::runner::RunnerError;

pub const EXIT_OK: i32 = 0;
/// Malformed target, malformed payload, unreadable stdin.
pub const EXIT_USAGE: i32 = 2;
/// Could not reach or handshake with the server, or list its tools.
pub const EXIT_CONNECT: i32 = 3;
/// The remote call itself failed.
pub const EXIT_TOOL: i32 = 4;

/// Map a connection failure to its exit class: transport-phase errors are
/// target-syntax problems (usage), handshake failures are connect errors.
pub fn runner_exit_code(error: &RunnerError) -> i32 {
    match error {
        RunnerError::Transport(_) => EXIT_USAGE,
        RunnerError::Connect(_) => EXIT_CONNECT,
    }
}
