pub mod rfc2136;

pub use rfc2136::Rfc2136UpdateClient;
