use clap::Subcommand;

/// Agent subscription commands. Agents are named `module::agent`.
#[derive(Clone, Debug, Subcommand)]
pub enum AgentCommands {
    /// List subscribed agents.
    List,
    /// Agents of subscribed modules not yet subscribed.
    Missing,
    /// Subscribe agents.
    Subscribe {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Subscribe every missing agent.
    SubscribeMissing,
    /// Unsubscribe an optional agent.
    Unsubscribe { key: String },
}
