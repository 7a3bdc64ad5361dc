use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod auth;
mod catalog;
mod cli;
mod config;
mod controller;
mod draft;
mod form;
mod persistence;
mod records;
mod remote;
mod render;
mod storage;
#[cfg(test)]
mod test_support;
mod validate;
mod workflow;

use cli::{Command, RootArgs};
use workflow::AppContext;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let state_dir = args.state_dir.as_deref();
    let context = || AppContext::load(state_dir);
    match &args.command {
        Command::Init(init) => workflow::run_init(&config::resolve_state_dir(state_dir)?, init),
        Command::Fees => workflow::run_fees(),
        Command::Status(status) => workflow::run_status(&context()?, status),
        Command::Set(set) => workflow::run_set(&context()?, set),
        Command::Blur(blur) => workflow::run_blur(&context()?, blur),
        Command::Attach(attach) => workflow::run_attach(&context()?, attach),
        Command::Next => workflow::run_next(&context()?),
        Command::Back => workflow::run_back(&context()?),
        Command::RequestLink => workflow::run_request_link(&context()?),
        Command::Verify(verify) => workflow::run_verify(&context()?, verify),
        Command::Review => workflow::run_review(&context()?),
        Command::Submit => workflow::run_submit(&context()?),
        Command::Reset => workflow::run_reset(&context()?),
    }
}

/// Log to stderr; `RUST_LOG` wins, otherwise warnings only (debug with --verbose).
fn init_tracing(verbose: bool) {
    let default = if verbose { "confreg=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
