pub mod blur;
pub mod color;
pub mod composite;
pub mod filter;
