//! Background tasks module
//!
//! The appliance loop together with its scheduler and channel supervisor.

pub mod appliance;
pub mod scheduler;
pub mod supervisor;

// Re-export main types
pub use appliance::{Appliance, ApplianceError, ApplianceSettings, Hardware, StepOutcome};
pub use scheduler::{Scheduler, SERVICE_PERIOD, TICK_PERIOD};
pub use supervisor::{ReconnectSupervisor, ServiceReport};
