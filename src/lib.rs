pub mod api;
pub mod config;
pub mod db;
pub mod notifications;
pub mod reset;
pub mod session;
pub mod ui;

pub use db::DbPool;

use config::Config;
use notifications::SystemEmailService;
use reset::ConsumedTokens;
use session::SessionStore;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub sessions: SessionStore,
    pub used_reset_tokens: ConsumedTokens,
    pub mailer: SystemEmailService,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let sessions = SessionStore::new(config.auth.session_idle_minutes);
        let mailer = SystemEmailService::new(config.email.clone());
        Self {
            config,
            db,
            sessions,
            used_reset_tokens: ConsumedTokens::new(),
            mailer,
        }
    }
}
