//! Magic-link request and redirect handling.
use super::AppContext;
use crate::cli::VerifyArgs;
use crate::controller::LinkOutcome;
use crate::draft::Field;
use crate::render;
use anyhow::{anyhow, Result};

pub fn run_request_link(context: &AppContext) -> Result<()> {
    context.with_controller(|controller| {
        let outcome = controller.request_link()?;
        print!("{}", render::render_notices(controller.notices()));
        match outcome {
            LinkOutcome::Sent { .. } | LinkOutcome::AlreadyVerified => Ok(()),
            LinkOutcome::InvalidEmail => {
                print!("{}", render::render_field_errors(controller, &[Field::Email]));
                Err(anyhow!("verification link not sent"))
            }
            LinkOutcome::MissingEmail | LinkOutcome::Failed | LinkOutcome::InFlight => {
                Err(anyhow!("verification link not sent"))
            }
        }
    })
}

pub fn run_verify(context: &AppContext, args: &VerifyArgs) -> Result<()> {
    context.with_controller(|controller| {
        let outcome = controller.handle_redirect(&args.redirect_url)?;
        print!("{}", render::render_notices(controller.notices()));
        println!("location: {}", outcome.location);
        if outcome.verified {
            println!("Email verified: {}", controller.draft().personal.email.trim());
            return Ok(());
        }
        if controller.notices().banner.is_some() {
            return Err(anyhow!("email verification did not complete"));
        }
        let signed_in = controller.verification().status().email().map(str::to_string);
        match signed_in {
            Some(email) => Err(anyhow!(
                "signed in as {email}, which does not match the draft's email"
            )),
            None => Err(anyhow!("redirect URL carried no verification result")),
        }
    })
}
