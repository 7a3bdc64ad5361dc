//! Review, submission and the fee table.
use super::AppContext;
use crate::controller::SubmitOutcome;
use crate::render;
use anyhow::{anyhow, Result};

pub fn run_review(context: &AppContext) -> Result<()> {
    context.with_controller(|controller| {
        print!("{}", render::render_review(controller.draft()));
        let submit = if controller.can_submit() {
            "enabled"
        } else {
            "disabled"
        };
        println!("Submit: {submit}");
        Ok(())
    })
}

pub fn run_submit(context: &AppContext) -> Result<()> {
    context.with_controller(|controller| {
        let outcome = controller.submit()?;
        tracing::debug!(phase = ?controller.phase(), "submission finished");
        print!("{}", render::render_notices(controller.notices()));
        match outcome {
            SubmitOutcome::Submitted => Ok(()),
            SubmitOutcome::Blocked { invalid, .. } => {
                print!("{}", render::render_field_errors(controller, &invalid));
                Err(anyhow!(
                    "registration not submitted: {} field(s) need attention",
                    invalid.len()
                ))
            }
            SubmitOutcome::Failed { message } => Err(anyhow!("{message}")),
        }
    })
}

pub fn run_fees() -> Result<()> {
    print!("{}", render::render_fees());
    Ok(())
}
