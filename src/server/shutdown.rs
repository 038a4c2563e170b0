use tokio::sync::watch;

// Notifier lets the accept loops know that a graceful stop was requested.
// Live sessions are deliberately not signalled; they run to natural
// termination.
#[derive(Debug)]
pub struct Notifier {
    tx: watch::Sender<bool>,
}

impl Notifier {
    pub fn new() -> Notifier {
        let (tx, _) = watch::channel(false);
        Notifier { tx }
    }

    // Flips the flag; every subscribed Listener wakes up.
    pub fn notify(&self) {
        self.tx.send_replace(true);
    }

    pub fn subscribe(&self) -> Listener {
        Listener { rx: self.tx.subscribe() }
    }
}

// Listener waits for a shutdown notification.
#[derive(Debug)]
pub struct Listener {
    rx: watch::Receiver<bool>,
}

impl Listener {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    // Receive the shutdown notice, waiting if necessary.
    pub async fn listen(&mut self) {
        if self.is_shutdown() {
            return;
        }
        // An error means the Notifier was dropped, which counts as shutdown.
        let _ = self.rx.changed().await;
    }
}
