pub mod agent;
pub mod audit;
pub mod billing;
pub mod bundle;
pub mod catalog;
pub mod dispatch;
pub mod module;
pub mod onboard;
pub mod shared;
pub mod status;
pub mod tenant;
