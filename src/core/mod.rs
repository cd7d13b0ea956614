//! Runtime core: supervision engine.
//!
//! The public API from this module is [`Supervisor`] (with its builder, config and
//! status), the scheduling [`Handle`], and the [`Ambient`] default-instance slot.
//!
//! Internal modules:
//! - [`pool`]: fixed-size worker pool executing application entry methods;
//! - [`handle`]: scheduling handles and completion signalling;
//! - [`registry`]: handle → application bookkeeping;
//! - [`supervisor`]: registration, termination protocol, liveness sweep, run loop;
//! - [`shutdown`]: interrupt sources of the run loop;
//! - [`ambient`]: first-writer-wins default supervisor.

mod ambient;
mod builder;
mod config;
mod handle;
mod pool;
mod registry;
mod shutdown;
mod supervisor;

pub use ambient::Ambient;
pub use builder::SupervisorBuilder;
pub use config::{DEFAULT_SERVER_NAME, SupervisorConfig};
pub use handle::{Handle, HandleId};
pub use supervisor::{Supervisor, SupervisorStatus};
