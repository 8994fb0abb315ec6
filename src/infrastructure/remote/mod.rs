pub mod postgrest_sink;

pub use postgrest_sink::PostgrestRemoteSink;
