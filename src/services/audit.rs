use std::sync::Arc;

use crate::auth::Principal;
use crate::db::queries;
use crate::models::AuditKind;
use crate::state::AppState;

/// Persists an audit entry and pushes it to live subscribers. Failures are
/// logged, never returned: the action being audited has already happened.
pub fn record_audit_event(
    state: &Arc<AppState>,
    actor: &Principal,
    action: &str,
    kind: AuditKind,
    details: &str,
) {
    let inserted = match state.db() {
        Ok(db) => queries::insert_audit_event(&db, action, kind, &actor.email, details),
        Err(e) => Err(anyhow::anyhow!(e)),
    };

    match inserted {
        Ok(event) => {
            tracing::info!(action, actor = %actor.email, details, "admin action");
            // No receivers is fine
            let _ = state.audit_tx.send(event);
        }
        Err(e) => {
            tracing::error!(error = %e, action, "failed to record audit event");
        }
    }
}
