use crate::cli::{Cli, Command, Credentials};
use bazaar::domain::{FollowKey, FollowListEntry, FollowListQuery};
use bazaar::{FollowService, ViewerSession};
use bazaar_client::ApiClient;
use shared::{Error, Result};
use tracing::info;

pub struct App {
    pub client: ApiClient,
    pub follows: FollowService,
    pub session: ViewerSession,
}

impl App {
    pub async fn run(&self, cli: Cli) -> Result<()> {
        let login_required = matches!(cli.command, Command::Login);
        match credentials(&cli.credentials) {
            Some((email, password)) => self.sign_in(email, password).await?,
            None if login_required => {
                return Err(Error::Config(
                    "login needs --email and --password (or BAZAAR_EMAIL / BAZAAR_PASSWORD)"
                        .to_string(),
                ));
            }
            None => info!("No credentials given, continuing with anonymous session"),
        }

        match cli.command {
            Command::Login => {
                if let Some(viewer) = self.session.current() {
                    println!("{} (signed in at {})", viewer.id, viewer.signed_in_at_utc);
                }
            }
            Command::Status {
                target_id,
                target_type,
            } => {
                let key = FollowKey::new(target_id, target_type)?;
                println!("{key}\t{}", following_label(self.follows.status(&key).await));
            }
            Command::Toggle {
                target_id,
                target_type,
            } => {
                let key = FollowKey::new(target_id, target_type)?;
                let is_following = self.follows.toggle(&key).await?;
                println!("{key}\t{}", following_label(is_following));
            }
            Command::Prime { targets } => {
                let resolved = self.follows.prime(&targets).await;
                info!("Resolved {resolved} follow states");
                for key in &targets {
                    println!("{key}\t{}", following_label(self.follows.status(key).await));
                }
            }
            Command::List {
                slug,
                list_type,
                page,
                limit,
                entity_type,
            } => {
                let mut query = FollowListQuery::default().page(page).limit(limit);
                if let Some(entity_type) = entity_type {
                    query = query.entity_type(entity_type);
                }
                let entries = self.follows.list(&slug, list_type, &query).await?;
                if entries.is_empty() {
                    println!("No {list_type} on page {page}");
                }
                for entry in &entries {
                    println!("{}", list_row(entry));
                }
            }
        }

        self.sign_out_local();
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let viewer = self.client.login(email, password).await?;
        self.session.sign_in(viewer.id);
        Ok(())
    }

    // Server session stays valid; only the in-memory follow state is dropped
    fn sign_out_local(&self) {
        if self.session.is_signed_in() {
            self.session.sign_out();
        }
    }
}

fn credentials(credentials: &Credentials) -> Option<(&str, &str)> {
    match (&credentials.email, &credentials.password) {
        (Some(email), Some(password)) if !email.is_empty() => {
            Some((email.as_str(), password.as_str()))
        }
        _ => None,
    }
}

fn following_label(is_following: bool) -> &'static str {
    if is_following { "following" } else { "not following" }
}

fn list_row(entry: &FollowListEntry) -> String {
    let state = match entry.is_following {
        Some(is_following) => following_label(is_following),
        None => "-",
    };
    format!(
        "{}:{}\t{}\t{}",
        entry.id, entry.target_type, entry.name, state
    )
}
