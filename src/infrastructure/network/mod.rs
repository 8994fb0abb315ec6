pub mod connectivity;

pub use connectivity::WatchConnectivity;
