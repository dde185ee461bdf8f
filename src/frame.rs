pub mod device;
pub mod viewport;
