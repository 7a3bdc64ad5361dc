//! Field edits and step navigation.
use super::AppContext;
use crate::cli::{AttachArgs, BlurArgs, SetArgs};
use crate::controller::StepOutcome;
use crate::render;
use anyhow::{anyhow, Result};

pub fn run_set(context: &AppContext, args: &SetArgs) -> Result<()> {
    context.with_controller(|controller| {
        controller.set_text(args.field, &args.value)?;
        print!("{}", render::render_field_errors(controller, &[args.field]));
        Ok(())
    })
}

pub fn run_blur(context: &AppContext, args: &BlurArgs) -> Result<()> {
    context.with_controller(|controller| {
        controller.blur(args.field);
        print!("{}", render::render_field_errors(controller, &[args.field]));
        Ok(())
    })
}

pub fn run_attach(context: &AppContext, args: &AttachArgs) -> Result<()> {
    context.with_controller(|controller| match controller.attach_proof(&args.path)? {
        Some(message) => Err(anyhow!("{message}")),
        None => {
            if let Some(proof) = &controller.draft().payment.proof {
                println!("attached {} ({})", proof.file_name, proof.content_type);
            }
            Ok(())
        }
    })
}

pub fn run_next(context: &AppContext) -> Result<()> {
    context.with_controller(|controller| {
        let outcome = controller.next_step()?;
        print!("{}", render::render_notices(controller.notices()));
        match outcome {
            StepOutcome::Moved(step) => {
                println!("Step {}: {}", step.number(), step.title());
                Ok(())
            }
            StepOutcome::NoFurtherStep => {
                println!("Already on the final step; run `confreg submit`.");
                Ok(())
            }
            StepOutcome::Blocked { invalid } => {
                print!("{}", render::render_field_errors(controller, &invalid));
                Err(anyhow!(
                    "{} field(s) on this step need attention",
                    invalid.len()
                ))
            }
            StepOutcome::NeedsVerification => {
                print!(
                    "{}",
                    render::render_field_errors(controller, &[crate::draft::Field::Email])
                );
                Err(anyhow!(
                    "email not verified (run `confreg request-link` and open the link)"
                ))
            }
        }
    })
}

pub fn run_back(context: &AppContext) -> Result<()> {
    context.with_controller(|controller| {
        match controller.previous_step()? {
            Some(step) => println!("Step {}: {}", step.number(), step.title()),
            None => println!("Already on the first step."),
        }
        Ok(())
    })
}

pub fn run_reset(context: &AppContext) -> Result<()> {
    context.with_controller(|controller| {
        controller.reset()?;
        println!("Draft discarded.");
        Ok(())
    })
}
