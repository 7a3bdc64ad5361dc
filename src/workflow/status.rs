//! Status prints the current step without changing anything.
use super::AppContext;
use crate::cli::StatusArgs;
use crate::render;
use anyhow::{Context, Result};

pub fn run_status(context: &AppContext, args: &StatusArgs) -> Result<()> {
    let report =
        context.with_controller(|controller| Ok(render::build_status(controller, args.all)))?;
    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize status report")?;
        println!("{text}");
    } else {
        print!("{}", render::render_status_text(&report));
    }
    Ok(())
}
