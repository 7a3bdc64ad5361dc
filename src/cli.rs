//! CLI argument parsing for the registration client.
//!
//! Each invocation is one page load: the controller is mounted from local
//! storage, a single action is applied, and the controller is disposed.
use crate::draft::Field;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "confreg",
    version,
    about = "Conference registration with resumable drafts and email verification",
    after_help = "Commands:\n  init                      Write a config.json stub to the state directory\n  status [--json] [--all]   Show the current step, fields and errors\n  set <field> <value>       Edit a field (validated immediately, except email)\n  blur <field>              Leave a field: mark it touched and validate it\n  attach <path>             Attach the proof-of-payment file (image or PDF, max 5 MB)\n  next | back               Move between steps\n  request-link              Email a verification link to the draft's address\n  verify <redirect-url>     Complete verification from the link's redirect URL\n  review                    Show every answer before submitting\n  submit                    Validate everything and send the registration\n  reset                     Discard the draft and start over\n  fees                      Show the registration fee table\n\nExamples:\n  confreg set name \"Asha Rao\"\n  confreg set email asha@example.org\n  confreg request-link\n  confreg verify 'https://conf.example.org/registration#access_token=...'\n  confreg next\n  confreg submit",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// State directory holding config.json and the local draft storage
    #[arg(long, value_name = "DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Emit debug logging to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Status(StatusArgs),
    Set(SetArgs),
    Blur(BlurArgs),
    Attach(AttachArgs),
    /// Validate the current step and move to the next one
    Next,
    /// Return to the previous step
    Back,
    /// Email a one-time verification link to the draft's address
    RequestLink,
    Verify(VerifyArgs),
    /// Show the review summary
    Review,
    /// Validate every field and submit the registration
    Submit,
    /// Discard the draft and its verification state
    Reset,
    /// Show the registration fee table
    Fees,
}

#[derive(Parser, Debug)]
#[command(about = "Write a config.json stub to the state directory")]
pub struct InitArgs {
    /// Overwrite an existing config.json
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Show the current step, field values and errors")]
pub struct StatusArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Include fields from every step, not just the current one
    #[arg(long)]
    pub all: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Set a field value")]
pub struct SetArgs {
    /// Field name, e.g. name, email, phone, country, track_number, amount_paid
    #[arg(value_name = "FIELD")]
    pub field: Field,

    /// New value; choice fields take catalog ids, flags take yes/no
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Parser, Debug)]
#[command(about = "Leave a field: mark it touched and validate it")]
pub struct BlurArgs {
    #[arg(value_name = "FIELD")]
    pub field: Field,
}

#[derive(Parser, Debug)]
#[command(about = "Attach the proof-of-payment file")]
pub struct AttachArgs {
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Complete email verification from a magic-link redirect URL")]
pub struct VerifyArgs {
    /// The full URL the link redirected to, including its #fragment
    #[arg(value_name = "REDIRECT_URL")]
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        RootArgs::command().debug_assert();
    }

    #[test]
    fn parses_field_names_and_global_flags() {
        let args = RootArgs::try_parse_from([
            "confreg",
            "set",
            "place-of-affiliation",
            "Bangalore",
            "--state-dir",
            "/tmp/confreg",
        ])
        .expect("parse");
        assert_eq!(args.state_dir, Some(PathBuf::from("/tmp/confreg")));
        let Command::Set(set) = args.command else {
            panic!("expected set command");
        };
        assert_eq!(set.field, Field::PlaceOfAffiliation);
        assert_eq!(set.value, "Bangalore");

        assert!(RootArgs::try_parse_from(["confreg", "blur", "shoe_size"]).is_err());
    }
}
