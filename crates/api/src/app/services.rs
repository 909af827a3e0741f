use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use skillbridge_auth::JwtIssuer;
use skillbridge_events::EventService;
use skillbridge_identity::AuthService;
use skillbridge_infra::{InMemoryEventStore, InMemoryUserStore};

#[cfg(feature = "postgres")]
use skillbridge_infra::{PostgresEventStore, PostgresUserStore, postgres::migrate};
#[cfg(feature = "postgres")]
use sqlx::PgPool;

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub topic: String,
    pub payload: serde_json::Value,
}

pub struct AppServices {
    pub auth: AuthService,
    pub events: EventService,
    pub realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    /// Broadcast a realtime notification (lossy; no backpressure on handlers).
    pub fn publish(&self, topic: &str, payload: serde_json::Value) {
        let _ = self.realtime_tx.send(RealtimeMessage {
            topic: topic.to_string(),
            payload,
        });
    }
}

pub async fn build_services(jwt: Arc<dyn JwtIssuer>) -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        #[cfg(feature = "postgres")]
        {
            return build_persistent_services(jwt).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    build_in_memory_services(jwt)
}

fn build_in_memory_services(jwt: Arc<dyn JwtIssuer>) -> AppServices {
    // In-memory store wiring (dev/test).
    let users = Arc::new(InMemoryUserStore::new());
    let events = Arc::new(InMemoryEventStore::new());

    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    AppServices {
        auth: AuthService::new(users.clone(), jwt),
        events: EventService::new(events, users),
        realtime_tx,
    }
}

#[cfg(feature = "postgres")]
async fn build_persistent_services(jwt: Arc<dyn JwtIssuer>) -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");

    migrate(&pool).await.expect("Failed to run migrations");

    let users = Arc::new(PostgresUserStore::new(pool.clone()));
    let events = Arc::new(PostgresEventStore::new(pool));

    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    AppServices {
        auth: AuthService::new(users.clone(), jwt),
        events: EventService::new(events, users),
        realtime_tx,
    }
}

/// Build the SSE stream handed out by `/api/stream`.
pub fn realtime_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(m) => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        // A lagged receiver just skips what it missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
