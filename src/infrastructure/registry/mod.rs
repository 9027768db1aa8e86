//! Service registry adapters

mod consul;
mod static_registry;

pub use consul::ConsulRegistry;
pub use static_registry::StaticRegistry;
