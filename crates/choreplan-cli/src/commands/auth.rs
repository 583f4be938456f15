//! Account and session commands.

use clap::Subcommand;
use choreplan_core::{AuthService, Config, ProfileUpdate, SessionStore, SignupRequest};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Register a new account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show the authenticated user, if any
    Status,
    /// Update profile fields
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

fn service() -> Result<AuthService, Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let api = super::api_client(&cfg)?;
    Ok(AuthService::new(api, SessionStore::new()))
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let auth = service()?;
    match action {
        AuthAction::Signup {
            email,
            password,
            first_name,
            last_name,
        } => {
            auth.signup(&SignupRequest {
                email,
                password,
                first_name,
                last_name,
            })?;
            println!("Signup successful. Log in with `auth login`.");
        }
        AuthAction::Login { email, password } => {
            let profile = auth.login(&email, &password)?;
            println!("Logged in as {} <{}>", profile.display_name(), profile.email);
        }
        AuthAction::Logout => {
            auth.logout()?;
            println!("Logged out");
        }
        AuthAction::Status => match auth.current_user()? {
            Some(profile) => {
                println!("authenticated as {} <{}>", profile.display_name(), profile.email);
            }
            None => println!("not authenticated"),
        },
        AuthAction::Update {
            email,
            first_name,
            last_name,
        } => {
            let profile = auth.update_profile(&ProfileUpdate {
                email,
                first_name,
                last_name,
            })?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }
    Ok(())
}
