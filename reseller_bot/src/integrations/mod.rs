//! Glue between the engine and the outside services it talks to.
pub mod operator_alerts;
pub mod panel;

pub use operator_alerts::create_operator_alert_handlers;
pub use panel::PanelFulfillment;
