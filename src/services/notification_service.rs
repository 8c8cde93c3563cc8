use futures::{stream, Stream};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::DynStore;
use crate::error::{Error, Result};
use crate::middleware::auth::AuthContext;
use crate::models::notification::{NewNotification, Notification};

/// How many notifications the bell dropdown shows.
pub const RECENT_LIMIT: i64 = 20;

const HUB_CAPACITY: usize = 256;

/// Fan-out of freshly inserted notifications to live subscribers.
#[derive(Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<Notification>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(HUB_CAPACITY)
    }
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of live subscribers that saw the event.
    pub fn publish(&self, notification: &Notification) -> usize {
        self.sender.send(notification.clone()).unwrap_or(0)
    }

    /// Stream of notifications addressed to `user_id`, starting now.
    pub fn subscribe(&self, user_id: Uuid) -> impl Stream<Item = Notification> + Send + 'static {
        let receiver = self.sender.subscribe();
        stream::unfold(receiver, move |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(n) if n.user_id == user_id => return Some((n, receiver)),
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(%user_id, skipped, "notification subscriber lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
    }
}

#[derive(Clone)]
pub struct NotificationService {
    store: DynStore,
    hub: NotificationHub,
}

impl NotificationService {
    pub fn new(store: DynStore, hub: NotificationHub) -> Self {
        Self { store, hub }
    }

    pub async fn create(&self, notification: NewNotification) -> Result<Notification> {
        let row = self.store.insert_notification(notification).await?;
        let delivered = self.hub.publish(&row);
        debug!(notification_id = %row.id, user_id = %row.user_id, delivered, "notification created");
        Ok(row)
    }

    /// Most recent notifications plus the unread tally over those rows.
    pub async fn list_recent(&self, ctx: &AuthContext) -> Result<(Vec<Notification>, i64)> {
        let rows = self
            .store
            .list_recent_notifications(ctx.user_id, RECENT_LIMIT)
            .await?;
        let unread = rows.iter().filter(|n| !n.read).count() as i64;
        Ok((rows, unread))
    }

    /// Marks one notification read and returns the caller's unread count.
    pub async fn mark_read(&self, ctx: &AuthContext, id: Uuid) -> Result<i64> {
        self.store
            .mark_notification_read(id, ctx.user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Notification not found".into()))?;
        let unread = self.store.unread_notification_count(ctx.user_id).await?;
        Ok(unread.max(0))
    }

    pub async fn mark_all_read(&self, ctx: &AuthContext) -> Result<u64> {
        let updated = self.store.mark_all_notifications_read(ctx.user_id).await?;
        debug!(user_id = %ctx.user_id, updated, "marked all notifications read");
        Ok(updated)
    }

    pub fn subscribe(&self, ctx: &AuthContext) -> impl Stream<Item = Notification> + Send + 'static {
        self.hub.subscribe(ctx.user_id)
    }
}
