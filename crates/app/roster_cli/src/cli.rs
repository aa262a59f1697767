use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use roster_core::models::{StatusKind, UserRole};

/// Command-line front end for the Roster character service.
#[derive(Parser)]
#[command(name = "roster", version, about)]
pub struct Cli {
    /// API base URL (overrides ROSTER_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for credentials and the selected server (overrides ROSTER_DATA_DIR).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the CLI version.
    Version,
    /// Print the Discord sign-in URL.
    Login,
    /// Complete sign-in from the URL the browser was redirected to.
    Callback {
        /// Full callback URL, including its query string.
        url: String,
    },
    /// Forget the stored credentials.
    Logout,
    /// Show the signed-in user's profile.
    Me,
    /// Browse and select servers.
    #[command(subcommand)]
    Servers(ServerCommands),
    /// Manage characters on a server.
    #[command(subcommand)]
    Characters(CharacterCommands),
    /// Administer users (admin only).
    #[command(subcommand)]
    Users(UserCommands),
}

#[derive(Subcommand)]
pub enum ServerCommands {
    /// List all servers.
    List,
    /// Show the selected server.
    Current,
    /// Remember a server for later commands.
    Select { slug: String },
    /// Forget the selected server.
    Clear,
}

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// List characters on a server.
    List {
        /// Server slug; defaults to the selected server.
        #[arg(long)]
        server: Option<String>,
    },
    /// Create a character.
    Create {
        #[arg(long)]
        server: Option<String>,
        #[command(flatten)]
        fields: CharacterFields,
    },
    /// Update a character; omitted fields keep their current values.
    Update {
        id: String,
        #[arg(long)]
        server: Option<String>,
        #[command(flatten)]
        fields: CharacterUpdate,
    },
    /// Delete a character.
    Delete {
        id: String,
        #[arg(long)]
        server: Option<String>,
    },
}

#[derive(Args)]
pub struct CharacterFields {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value_t = 1)]
    pub level: i32,
    #[arg(long, default_value_t = 0)]
    pub cash: i64,
    #[arg(long, default_value_t = 0)]
    pub bank: i64,
    /// Status flag to grant, as KIND or KIND=EXPIRY (RFC 3339 or YYYY-MM-DD).
    #[arg(long = "status", value_parser = parse_status)]
    pub status: Vec<StatusArg>,
}

#[derive(Args)]
pub struct CharacterUpdate {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub level: Option<i32>,
    #[arg(long)]
    pub cash: Option<i64>,
    #[arg(long)]
    pub bank: Option<i64>,
    /// Status flag to grant, as KIND or KIND=EXPIRY.
    #[arg(long = "status", value_parser = parse_status)]
    pub status: Vec<StatusArg>,
    /// Status flag to revoke.
    #[arg(long = "revoke")]
    pub revoke: Vec<StatusKind>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all users.
    List,
    /// Change a user's role.
    SetRole { user_id: String, role: UserRole },
}

/// A status flag to grant, with an optional expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusArg {
    pub kind: StatusKind,
    pub expires_at: Option<DateTime<Utc>>,
}

fn parse_status(raw: &str) -> Result<StatusArg, String> {
    let (kind, expiry) = match raw.split_once('=') {
        Some((kind, expiry)) => (kind, Some(expiry)),
        None => (raw, None),
    };
    let kind = kind.parse::<StatusKind>().map_err(|e| e.to_string())?;
    let expires_at = expiry.map(parse_expiry).transpose()?;
    Ok(StatusArg { kind, expires_at })
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid expiry '{raw}': expected RFC 3339 or YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_without_expiry() {
        assert_eq!(
            parse_status("pet").unwrap(),
            StatusArg {
                kind: StatusKind::Pet,
                expires_at: None
            }
        );
    }

    #[test]
    fn status_with_date_expiry() {
        let arg = parse_status("vip_status=2026-12-01").unwrap();
        assert_eq!(arg.kind, StatusKind::VipStatus);
        assert_eq!(
            arg.expires_at,
            Some(Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn status_with_rfc3339_expiry() {
        let arg = parse_status("medical-card=2026-01-02T03:04:05+02:00").unwrap();
        assert_eq!(arg.kind, StatusKind::MedicalCard);
        assert_eq!(
            arg.expires_at,
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 1, 4, 5).unwrap())
        );
    }

    #[test]
    fn rejects_bad_status() {
        assert!(parse_status("yacht").is_err());
        assert!(parse_status("pet=tomorrow").is_err());
    }
}
