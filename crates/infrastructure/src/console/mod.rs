pub mod server;

pub use server::ConsoleServer;
