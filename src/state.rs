use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::auth::CredentialVerifier;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::AuditEvent;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub verifier: Box<dyn CredentialVerifier>,
    pub audit_tx: broadcast::Sender<AuditEvent>,
}

impl AppState {
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
    }
}
