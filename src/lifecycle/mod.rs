pub mod studio_system;
pub mod tracing;

pub use studio_system::StudioSystem;
pub use self::tracing::setup_tracing;
