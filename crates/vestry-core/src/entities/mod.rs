//! Entity structs for all Vestry domain objects.
//!
//! Each entity maps to a table in the libSQL store (see `vestry-db/migrations`).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! output and schema validation.

mod agent;
mod audit;
mod bundle;
mod church;
mod module;
mod profile;
mod subscription;

pub use agent::Agent;
pub use audit::AuditEntry;
pub use bundle::Bundle;
pub use church::Church;
pub use module::Module;
pub use profile::Profile;
pub use subscription::{AgentSubscription, BundleSubscription, ModuleSubscription};
