pub mod json_udp;

pub use json_udp::JsonUdpListener;
