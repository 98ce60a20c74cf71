use clap::Subcommand;
use serde_json::json;

use crate::cli::config::build_context;
use crate::cli::utils::{output_fields, output_json, output_success, value_or_prompt};
use crate::cli::OutputFormat;
use crate::forms::{SignInForm, SignUpForm};

use super::users::print_user;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Create an account and sign in")]
    Signup {
        #[arg(help = "Account email")]
        email: String,
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Mobile phone number")]
        phone: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show the stored session")]
    Status,

    #[command(about = "Exchange the refresh cookie for a new access token")]
    Refresh,

    #[command(about = "Show the signed-in user's profile")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let context = build_context()?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let form = SignInForm {
                password: value_or_prompt(password, "Password")?,
                email,
            };
            context.account.sign_in(&form).await?;
            output_success(
                &output_format,
                &format!("Signed in as {}", form.email.trim()),
                Some(json!({ "email": form.email.trim() })),
            )
        }
        AuthCommands::Signup { email, name, phone, password } => {
            let form = SignUpForm {
                password: value_or_prompt(password, "Password")?,
                email,
                name,
                phone,
            };
            context.account.sign_up(&form).await?;
            output_success(
                &output_format,
                &format!("Account created for {}", form.email.trim()),
                Some(json!({ "email": form.email.trim() })),
            )
        }
        AuthCommands::Logout => {
            context.account.logout().await;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => {
            let status = context.account.status();
            match output_format {
                OutputFormat::Json => output_json(&serde_json::to_value(&status)?),
                OutputFormat::Text => {
                    output_fields(&[
                        ("Authenticated", status.authenticated.to_string()),
                        ("Subject", status.subject.clone().unwrap_or_else(|| "-".to_string())),
                        ("Email", status.email.clone().unwrap_or_else(|| "-".to_string())),
                        (
                            "Expires",
                            status
                                .expires_at
                                .map(|t| t.to_rfc3339())
                                .unwrap_or_else(|| "-".to_string()),
                        ),
                        ("Expired", status.expired.to_string()),
                        ("Refresh cookie", status.has_refresh_cookie.to_string()),
                    ]);
                    Ok(())
                }
            }
        }
        AuthCommands::Refresh => {
            if context.account.refresh().await? {
                output_success(&output_format, "Access token refreshed", None)
            } else {
                Err(anyhow::anyhow!("Token refresh was rejected; sign in again"))
            }
        }
        AuthCommands::Whoami => {
            let user = context.account.me().await?;
            print_user(&user, &output_format)
        }
    }
}
