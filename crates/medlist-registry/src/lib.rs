//! Parser for the XML export of the medicinal-products register.

pub mod registry;

pub use registry::RegistryParser;
