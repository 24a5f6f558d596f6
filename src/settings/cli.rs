use super::Parser;

/// Token issuance and session service.
#[derive(Parser, Debug)]
#[command(name = "warden", version, about)]
pub struct Cli {
    /// Path to a TOML settings file; defaults to settings/dev.toml in debug builds.
    #[arg(long)]
    pub settings: Option<String>,
}
