//! Types command - List supported LMS types

use clap::Args;
use lms_validator::config::ValidatorSettings;

use crate::error::CliResult;

/// Arguments for the types command
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the types command
pub fn execute(args: TypesArgs) -> CliResult<()> {
    let registry = lms_validator_canvas::default_registry(ValidatorSettings::default())?;
    let types = registry.supported_types();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&types)?);
    } else {
        for lms_type in types {
            println!("{lms_type}");
        }
    }

    Ok(())
}
