pub mod clock;
pub mod connectivity;
pub mod key_store;
pub mod payload_cipher;
pub mod queue_store;
pub mod remote_sink;

pub use clock::Clock;
pub use connectivity::ConnectivitySignal;
pub use key_store::DeviceKeyStore;
pub use payload_cipher::PayloadCipher;
pub use queue_store::QueueStore;
pub use remote_sink::{RemoteSink, dispatch};
