mod agent;
mod bundle;
mod catalog;
mod module;
mod tenant;

pub use agent::AgentCommands;
pub use bundle::BundleCommands;
pub use catalog::CatalogCommands;
pub use module::ModuleCommands;
pub use tenant::TenantCommands;
