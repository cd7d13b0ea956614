//! # Ambient (default) supervisor.
//!
//! Applications that are launched without an explicit supervisor bind to the
//! supervisor held by an [`Ambient`]. The slot is filled exactly once:
//! - explicitly, via [`Ambient::install`] / [`SupervisorBuilder::install_into`](crate::SupervisorBuilder::install_into)
//!   (first writer wins, later installs are ignored);
//! - or lazily, by the first launch that needs it: a supervisor with default
//!   configuration and `autostart` enabled is created.
//!
//! [`Ambient::global`] is the process-wide instance. Tests and embedders that want
//! isolation create their own (`static` or owned) instances.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::core::{config::SupervisorConfig, supervisor::Supervisor};
use crate::error::SupervisorError;

static GLOBAL: Ambient = Ambient::new();

/// First-writer-wins slot for a default [`Supervisor`].
pub struct Ambient {
    slot: OnceCell<Arc<Supervisor>>,
    create_default: bool,
}

impl Ambient {
    /// An empty slot that creates an autostarting default supervisor on demand.
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
            create_default: true,
        }
    }

    /// An empty slot that never creates a supervisor by itself.
    ///
    /// Lookups fail with [`SupervisorError::NotFound`] until one is installed.
    pub const fn lookup_only() -> Self {
        Self {
            slot: OnceCell::new(),
            create_default: false,
        }
    }

    /// The process-wide ambient slot.
    pub fn global() -> &'static Ambient {
        &GLOBAL
    }

    /// Returns the installed supervisor, if any.
    pub fn get(&self) -> Option<Arc<Supervisor>> {
        self.slot.get().cloned()
    }

    /// Installs `sup` as the default if the slot is empty; returns whether it was installed.
    pub fn install(&self, sup: Arc<Supervisor>) -> bool {
        let name = sup.name().to_string();
        let installed = self.slot.set(sup).is_ok();
        if installed {
            debug!("Supervisor ({name}) installed as default instance");
        }
        installed
    }

    /// Returns the installed supervisor, creating the default one if allowed.
    ///
    /// ### Errors
    /// - [`SupervisorError::NotFound`] for a lookup-only slot that is empty;
    /// - [`SupervisorError::Pool`] if the default supervisor cannot be built.
    pub fn get_or_create(&self) -> Result<Arc<Supervisor>, SupervisorError> {
        if let Some(sup) = self.get() {
            return Ok(sup);
        }
        if !self.create_default {
            return Err(SupervisorError::NotFound);
        }

        self.slot
            .get_or_try_init(|| {
                debug!("Creating default Supervisor instance as one is not set");
                Supervisor::builder(SupervisorConfig {
                    autostart: true,
                    ..SupervisorConfig::default()
                })
                .build()
            })
            .cloned()
    }
}

impl Default for Ambient {
    fn default() -> Self {
        Self::new()
    }
}
