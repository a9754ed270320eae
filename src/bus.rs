use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Named broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because the sensor and control threads publish too.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    name: &'static str,
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { name, tx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Publish to every current subscriber and return how many there were.
    /// With nobody listening the message is dropped.
    pub fn publish(&self, msg: T) -> usize {
        match self.tx.send(Arc::new(msg)) {
            Ok(n) => n,
            Err(_) => {
                trace!(topic = self.name, "No subscribers, message dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_behaviour::DriveCommand;

    #[tokio::test]
    async fn test_every_subscriber_sees_command() {
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 4);
        let mut a = topic.subscribe();
        let mut b = topic.subscribe();
        assert_eq!(topic.publish(DriveCommand::XLock), 2);
        assert_eq!(*a.recv().await.unwrap(), DriveCommand::XLock);
        assert_eq!(*b.recv().await.unwrap(), DriveCommand::XLock);
    }

    #[tokio::test]
    async fn test_command_without_subscribers_is_dropped() {
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 4);
        assert_eq!(topic.publish(DriveCommand::Stop), 0);
        let mut late = topic.subscribe();
        assert!(late.try_recv().is_err());
        assert_eq!(topic.name(), "drive_cmd");
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 2);
        let mut rx = topic.subscribe();
        for _ in 0..3 {
            topic.publish(DriveCommand::Stop);
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
    }
}
