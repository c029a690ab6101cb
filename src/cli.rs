use clap::Parser;

/// Interactive console for local scripts, scaffolded projects and remote hosts.
///
/// All behavior is driven from the menus; configuration comes from AERONULL_* environment
/// variables (an optional .env file is loaded first).
#[derive(Parser, Debug)]
#[command(name = "aeronull", version, about)]
pub(crate) struct Cli {}
