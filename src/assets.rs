pub mod decode;
#[cfg(feature = "http")]
pub mod http;
pub mod resolve;
pub mod store;
