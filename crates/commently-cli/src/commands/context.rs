//! Shared setup for commands: data directory, config, service and actor

use anyhow::{Context, Result};
use clap::Args;
use commently_core::config::Config;
use commently_core::policy::ModeratorPolicy;
use commently_core::{Actor, CommentService, GuestInfo, MorphRef};
use commently_storage::FileSystemStore;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub const CONFIG_FILE: &str = "config.toml";

/// Global flags every command needs
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub moderators: Vec<String>,
}

impl Globals {
    /// Data directory from the flag, or the platform default
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(commently_storage::default_data_dir)
    }

    /// Explicit config path, else config.toml in the data directory
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.data_dir().join(CONFIG_FILE))
    }

    /// Load the config; a missing default file means defaults
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        if self.config.is_none() && !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Config::default());
        }
        Config::load(&path).with_context(|| format!("Failed to load config {}", path.display()))
    }

    /// Open the store and build the service
    pub fn open(&self) -> Result<App> {
        let config = self.load_config()?;
        let data_dir = self.data_dir();
        let store = FileSystemStore::new(&data_dir)
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;

        let user_model = config.user_model.clone();
        let moderators: Vec<MorphRef> = self
            .moderators
            .iter()
            .map(|id| MorphRef::new(user_model.as_str(), id))
            .collect();
        let service = CommentService::builder(config, Arc::new(store))
            .policy(ModeratorPolicy::new(moderators))
            .build()?;

        Ok(App {
            service,
            user_model,
        })
    }
}

/// An opened data directory
pub struct App {
    pub service: CommentService,
    user_model: String,
}

impl App {
    pub fn actor(&self, args: &ActorArgs) -> Actor {
        args.to_actor(&self.user_model)
    }
}

/// Who is acting
#[derive(Debug, Clone, Args)]
pub struct ActorArgs {
    /// Act as this authenticated user id
    #[arg(long, value_name = "ID", conflicts_with_all = ["guest_name", "guest_email"])]
    pub user: Option<String>,

    /// Act as a guest with this name
    #[arg(long, value_name = "NAME")]
    pub guest_name: Option<String>,

    /// Guest email
    #[arg(long, value_name = "EMAIL")]
    pub guest_email: Option<String>,

    /// Client IP address
    #[arg(long, default_value = "127.0.0.1")]
    pub ip: IpAddr,
}

impl ActorArgs {
    pub fn to_actor(&self, user_model: &str) -> Actor {
        match &self.user {
            Some(id) => Actor::user(MorphRef::new(user_model, id), self.ip),
            None => Actor::guest(
                GuestInfo {
                    name: self.guest_name.clone(),
                    email: self.guest_email.clone(),
                },
                self.ip,
            ),
        }
    }
}
