use tokio::sync::watch;

pub trait ConnectivitySignal: Send + Sync {
    fn is_online(&self) -> bool;
    /// Receiver whose value flips on every online/offline transition.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
