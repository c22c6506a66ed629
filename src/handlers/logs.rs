use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::Deserialize;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;

use crate::auth::{require_admin, require_admin_token};
use crate::db::queries::{self, AuditFilter};
use crate::errors::AppError;
use crate::models::{AuditEvent, AuditKind};
use crate::state::AppState;

const DEFAULT_LOG_LIMIT: i64 = 200;
const MAX_LOG_LIMIT: i64 = 1000;

fn sse_event(event: &AuditEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_default();
    Event::default()
        .id(event.id.to_string())
        .event("audit_event")
        .data(data)
}

// GET /api/admin/logs?kind=&q=&limit=&offset=
#[derive(Deserialize)]
pub struct LogsQuery {
    pub kind: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<LogsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(state.verifier.as_ref(), &headers).await?;

    let kind = match query.kind.as_deref() {
        None | Some("ALL") => None,
        Some(raw) => Some(
            AuditKind::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown log kind: {raw}")))?,
        ),
    };
    let filter = AuditFilter {
        kind,
        search: query.q,
        limit: query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT),
        offset: query.offset.unwrap_or(0).max(0),
    };

    let (logs, total) = {
        let db = state.db()?;
        (
            queries::list_audit_events(&db, &filter)?,
            queries::count_audit_events(&db, &filter)?,
        )
    };

    Ok(Json(serde_json::json!({
        "logs": logs,
        "count": logs.len(),
        "total": total,
        "offset": filter.offset,
    })))
}

// GET /api/admin/logs/events (SSE)
#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
    pub last_id: Option<i64>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource can't set headers, so the token travels in the query
    require_admin_token(state.verifier.as_ref(), query.token.as_deref()).await?;

    // Subscribe before catching up so nothing falls between the two
    let rx = state.audit_tx.subscribe();
    let last_id = query.last_id.unwrap_or(0);
    let catchup_events = {
        let db = state.db()?;
        queries::get_audit_events_since(&db, last_id)?
    };
    let replayed_up_to = catchup_events.last().map(|e| e.id).unwrap_or(last_id);

    let catchup_stream = tokio_stream::iter(
        catchup_events
            .into_iter()
            .map(|event| Ok::<_, Infallible>(sse_event(&event))),
    );

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.id > replayed_up_to => Some(Ok(sse_event(&event))),
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "audit subscriber lagged");
            None
        }
    });

    let keepalive_stream = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok(Event::default().comment("keepalive")));

    let combined = catchup_stream.chain(live_stream);
    Ok(Sse::new(combined.merge(keepalive_stream)))
}
