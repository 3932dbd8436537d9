mod app_context;
mod config_warnings;
mod tenant;

pub use app_context::AppContext;
pub use config_warnings::warn_unconfigured;
pub use tenant::{TenantSource, resolve_tenant};
