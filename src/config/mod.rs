use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{CONFIG_PATH_VAR, find_config_file, read_config, read_config_from};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

use crate::learning::LessonQuota;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    progression: Progression,
    #[serde(default)]
    quiz: Quiz,
    #[serde(default)]
    client: ClientSettings,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    #[serde(default)]
    store: StoreKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Default, Deserialize)]
pub struct Progression {
    lessons_per_subject: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Quiz {
    feedback_hold_ms: u64,
}

impl Default for Quiz {
    fn default() -> Self {
        Self {
            feedback_hold_ms: 2500,
        }
    }
}

/// Presentation preferences handed to clients as-is.
#[derive(Debug, Clone, Deserialize, serde::Serialize, utoipa::ToSchema)]
pub struct ClientSettings {
    pub theme: String,
    pub sound: bool,
    pub animations: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            theme: String::from("default"),
            sound: true,
            animations: true,
        }
    }
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    Self::from_slice(&bytes)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        crate::error::log_error(&e);
                        tracing::error!("unable to load configuration, exiting.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.app.jwt.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "app.jwt",
                reason: "signing key must not be empty",
            });
        }
        if self.progression.lessons_per_subject == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "progression.lessons_per_subject",
                reason: "a subject needs at least one lesson to unlock the next",
            });
        }
        Ok(())
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    #[inline]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[inline]
    pub fn client(&self) -> &ClientSettings {
        &self.client
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn store(&self) -> StoreKind {
        self.store
    }
}

impl Progression {
    /// Fixed quota when configured, otherwise counted from each subject's lessons.
    pub fn lesson_quota(&self) -> LessonQuota {
        match self.lessons_per_subject {
            Some(n) => LessonQuota::Fixed(n),
            None => LessonQuota::Counted,
        }
    }
}

impl Quiz {
    #[inline]
    pub fn feedback_hold_ms(&self) -> u64 {
        self.feedback_hold_ms
    }
}
