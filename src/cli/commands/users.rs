use clap::Subcommand;

use crate::cli::config::build_context;
use crate::cli::utils::{output_fields, output_json};
use crate::cli::OutputFormat;
use crate::models::User;

#[derive(Subcommand)]
pub enum UsersCommands {
    #[command(about = "Show a user profile by id")]
    Get {
        #[arg(help = "User id")]
        id: i64,
    },
}

pub async fn handle(cmd: UsersCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let context = build_context()?;

    match cmd {
        UsersCommands::Get { id } => {
            let user = context.account.user(id).await?;
            print_user(&user, &output_format)
        }
    }
}

pub(crate) fn print_user(user: &User, output_format: &OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(&serde_json::to_value(user)?),
        OutputFormat::Text => {
            output_fields(&[
                ("Id", user.id.to_string()),
                ("Name", user.display_name().to_string()),
                ("Email", user.email.clone()),
                ("Phone", user.phone.clone().unwrap_or_default()),
            ]);
            Ok(())
        }
    }
}
