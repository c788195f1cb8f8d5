pub mod client;
pub mod forms;

pub use client::{ClientError, GatewayClient};
pub use forms::FormError;
