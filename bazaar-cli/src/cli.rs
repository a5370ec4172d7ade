use bazaar::domain::{FollowKey, FollowListType, TargetType};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bazaar", about = "Follow tools for the Bazaar storefront API")]
pub struct Cli {
    #[command(flatten)]
    pub credentials: Credentials,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct Credentials {
    /// Sign in before running the command
    #[arg(long, env = "BAZAAR_EMAIL", global = true)]
    pub email: Option<String>,

    #[arg(long, env = "BAZAAR_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the credentials and print the signed-in viewer
    Login,

    /// Does the viewer follow this target
    Status {
        target_id: String,
        #[arg(value_parser = parse_target_type)]
        target_type: TargetType,
    },

    /// Follow or unfollow a target
    Toggle {
        target_id: String,
        #[arg(value_parser = parse_target_type)]
        target_type: TargetType,
    },

    /// Resolve many targets with batch requests, as a list view would
    Prime {
        /// Targets as <id>:<type>, e.g. shop-42:shop
        #[arg(required = true, value_parser = parse_follow_key)]
        targets: Vec<FollowKey>,
    },

    /// Show a followers/following page
    List {
        slug: String,
        #[arg(value_parser = parse_list_type)]
        list_type: FollowListType,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long = "entity-type", value_parser = parse_target_type)]
        entity_type: Option<TargetType>,
    },
}

fn parse_target_type(raw: &str) -> Result<TargetType, String> {
    raw.parse()
        .map_err(|_| format!("expected user or shop, got {raw}"))
}

fn parse_list_type(raw: &str) -> Result<FollowListType, String> {
    raw.parse()
        .map_err(|_| format!("expected followers or following, got {raw}"))
}

fn parse_follow_key(raw: &str) -> Result<FollowKey, String> {
    raw.parse().map_err(|e: shared::Error| e.to_string())
}
