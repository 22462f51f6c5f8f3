pub mod loader;

pub use loader::FileZoneSource;
