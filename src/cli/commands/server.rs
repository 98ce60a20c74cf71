use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{app_config, load_profile, ping_server, save_profile};
use crate::cli::utils::{output_fields, output_json, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Use this API base URL for later commands")]
    Set {
        #[arg(help = "API base URL, e.g. https://api.example.kr")]
        url: String,
    },

    #[command(about = "Show the API base URL in use")]
    Show,

    #[command(about = "Check that the API base URL is reachable")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            let parsed = url::Url::parse(url.trim())
                .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;

            let mut profile = load_profile()?;
            profile.api_url = Some(parsed.to_string());
            save_profile(&profile)?;

            output_success(
                &output_format,
                &format!("API server set to {}", parsed),
                Some(json!({ "api_url": parsed.to_string() })),
            )
        }
        ServerCommands::Show => {
            let profile = load_profile()?;
            let config = app_config()?;
            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "api_url": config.api.base_url,
                    "environment": config.environment,
                    "last_ping": profile.last_ping,
                    "status": profile.status,
                })),
                OutputFormat::Text => {
                    output_fields(&[
                        ("API URL", config.api.base_url.clone()),
                        ("Environment", format!("{:?}", config.environment)),
                        ("Status", format!("{:?}", profile.status)),
                        (
                            "Last ping",
                            profile
                                .last_ping
                                .map(|t| t.to_rfc3339())
                                .unwrap_or_else(|| "never".to_string()),
                        ),
                    ]);
                    Ok(())
                }
            }
        }
        ServerCommands::Ping => {
            let url = app_config()?.api.base_url;
            let status = ping_server(&url).await;

            let mut profile = load_profile()?;
            profile.update_ping(status);
            save_profile(&profile)?;

            output_success(
                &output_format,
                &format!("{} is {:?}", url, status),
                Some(json!({ "api_url": url, "status": status })),
            )
        }
    }
}
