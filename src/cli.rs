//! CLI domain: parse, route and output only.
//! No domain orchestration; a single route table dispatches to the resource API.

mod output;
mod parse;
mod route;

pub use output::{format_dataset, format_versions, map_error};
pub use parse::{Cli, Commands};
pub use route::{resolve_identifier, RunContext};
