use crossbeam_channel::{after, bounded, select, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A cancellation signal shared by every blocking loop of a run.
///
/// Cancelling drops the only sender, which disconnects the channel: every clone observes it, and
/// any `select!` on [CancelToken::channel] wakes up.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        let (sender, receiver) = bounded(0);
        CancelToken {
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver,
        }
    }
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        let mut sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        sender.take();
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Becomes ready (with an error) once cancelled.
    pub fn channel(&self) -> &Receiver<()> {
        &self.receiver
    }

    /// Sleeps for `duration`. Returns `false` if cancelled before it elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        select! {
            recv(self.receiver) -> _ => false,
            recv(after(duration)) -> _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_cancel() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        assert!(token.sleep(Duration::from_millis(1)));

        let start = Instant::now();
        let handle = thread::spawn(move || clone.sleep(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert!(!handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(token.is_cancelled());
        assert!(!token.sleep(Duration::from_secs(30)));
    }
}
