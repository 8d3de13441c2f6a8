//! Validate command - Run a full credential validation

use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use lms_validator::prelude::*;
use lms_validator_canvas::{API_TOKEN, BASE_URL};

use crate::error::{CliError, CliResult};

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// LMS type to validate against (case-insensitive)
    #[arg(long = "lms-type", short = 't')]
    pub lms_type: String,

    /// JSON file holding the credential bundle
    #[arg(long, short = 'c')]
    pub credentials: Option<PathBuf>,

    /// Instance base URL
    #[arg(long, env = "LMS_BASE_URL")]
    pub base_url: Option<String>,

    /// API token
    #[arg(long, env = "LMS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Execute the validate command
pub async fn execute(args: ValidateArgs) -> CliResult<()> {
    let settings = ValidatorSettings::from_env()?;
    debug!(
        request_timeout_secs = settings.request_timeout_secs,
        connect_timeout_secs = settings.connect_timeout_secs,
        "Loaded validator settings"
    );

    let registry = lms_validator_canvas::default_registry(settings)?;
    let credentials = load_credentials(&args)?;
    debug!(lms_type = %args.lms_type, credentials = ?credentials, "Loaded credentials");

    let validator = registry.create(&args.lms_type, credentials)?;
    let result = validate(validator.as_ref()).await;

    let output = if args.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{output}");

    if result.is_valid() {
        Ok(())
    } else {
        Err(CliError::ValidationFailed(result.message().to_string()))
    }
}

/// Build the credential bundle from a file or from the URL/token flags.
///
/// A credentials file takes precedence over the flags.
pub fn load_credentials(args: &ValidateArgs) -> CliResult<CredentialBundle> {
    if let Some(path) = &args.credentials {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        return Ok(CredentialBundle::try_from(value)?);
    }

    match (&args.base_url, &args.api_token) {
        (Some(base_url), Some(api_token)) => Ok(CredentialBundle::new()
            .with(BASE_URL, base_url.as_str())
            .with(API_TOKEN, api_token.as_str())),
        _ => Err(CliError::Rejected(
            "provide --credentials <file> or both --base-url and --api-token".to_string(),
        )),
    }
}
