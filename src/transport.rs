//! Target classification (stdio command vs http/sse URL).
//!
//! classify / classify_argv -> TransportTarget { Stdio | Http | Sse }
//! Pure string work only; spawning and connecting live in `runner`.

use anyhow::{Result, anyhow, bail};
use std::fmt;
use url::Url;

/// A classified, validated target ready for transport construction.
///
/// `Sse` URLs are already rewritten to their plain `http`/`https` form;
/// the variant records that the deprecated SSE stream flavor was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportTarget {
    /// A local process speaking MCP over stdin/stdout.
    Stdio { command: String, args: Vec<String> },
    /// A streamable-HTTP endpoint.
    Http { url: Url },
    /// An SSE endpoint (URL normalized from its `sse` prefix).
    Sse { url: Url },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stdio,
    Http,
    Sse,
}

impl fmt::Display for TransportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportTarget::Stdio { command, args } => {
                if args.is_empty() {
                    write!(f, "stdio: {command}")
                } else {
                    write!(f, "stdio: {command} {}", args.join(" "))
                }
            }
            TransportTarget::Http { url } => write!(f, "http: {url}"),
            TransportTarget::Sse { url } => write!(f, "sse: {url}"),
        }
    }
}

/// Classify a single target string.
///
/// - `sse://`, `sse+http://`, `sse+https://` (case-insensitive) -> `Sse`,
///   with the prefix rewritten to `http://` / `https://`
/// - `http://`, `https://` -> `Http`
/// - anything else -> `Stdio`, whitespace-split into command and arguments
pub fn classify(target: &str) -> Result<TransportTarget> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        bail!("target is empty");
    }
    match detect_kind(trimmed) {
        Kind::Http => Ok(TransportTarget::Http {
            url: parse_url(trimmed)?,
        }),
        Kind::Sse => Ok(TransportTarget::Sse {
            url: parse_url(&sse_url_to_http(trimmed))?,
        }),
        Kind::Stdio => {
            let mut words = trimmed.split_whitespace().map(str::to_string);
            let Some(command) = words.next() else {
                bail!("command is required for stdio transport");
            };
            Ok(TransportTarget::Stdio {
                command,
                args: words.collect(),
            })
        }
    }
}

/// Classify an argument vector (e.g. the variadic target of `connect`).
/// Detection runs on the space-joined form; a stdio target keeps the vector
/// as-is so pre-quoted arguments are not re-split.
pub fn classify_argv(argv: &[String]) -> Result<TransportTarget> {
    let joined = argv.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        bail!("target is empty");
    }
    match detect_kind(trimmed) {
        Kind::Http => Ok(TransportTarget::Http {
            url: parse_url(trimmed)?,
        }),
        Kind::Sse => Ok(TransportTarget::Sse {
            url: parse_url(&sse_url_to_http(trimmed))?,
        }),
        Kind::Stdio => {
            let Some((command, args)) = argv.split_first() else {
                bail!("command is required for stdio transport");
            };
            if command.trim().is_empty() {
                bail!("command is required for stdio transport");
            }
            Ok(TransportTarget::Stdio {
                command: command.clone(),
                args: args.to_vec(),
            })
        }
    }
}

fn detect_kind(target: &str) -> Kind {
    let lower = target.to_ascii_lowercase();
    if lower.starts_with("sse://")
        || lower.starts_with("sse+http://")
        || lower.starts_with("sse+https://")
    {
        Kind::Sse
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
        Kind::Http
    } else {
        Kind::Stdio
    }
}

/// Rewrite the deprecated SSE prefixes to their plain HTTP scheme;
/// bare `sse://` maps to `http://`.
fn sse_url_to_http(target: &str) -> String {
    let lower = target.to_ascii_lowercase();
    for (prefix, scheme) in [
        ("sse+https://", "https://"),
        ("sse+http://", "http://"),
        ("sse://", "http://"),
    ] {
        if lower.starts_with(prefix) {
            return format!("{scheme}{}", &target[prefix.len()..]);
        }
    }
    target.to_string()
}

fn parse_url(target: &str) -> Result<Url> {
    Url::parse(target).map_err(|e| anyhow!("invalid URL '{target}': {e}"))
}
