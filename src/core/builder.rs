use std::sync::Arc;

use super::{ambient::Ambient, config::SupervisorConfig, supervisor::Supervisor};
use crate::error::SupervisorError;

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    ambient: Option<&'static Ambient>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self { cfg, ambient: None }
    }

    /// Offers the built supervisor to `ambient` as its default instance.
    ///
    /// First writer wins: if `ambient` already holds a supervisor, it is kept and the
    /// built one is simply returned.
    pub fn install_into(mut self, ambient: &'static Ambient) -> Self {
        self.ambient = Some(ambient);
        self
    }

    /// Builds the supervisor and its worker pool.
    ///
    /// ### Errors
    /// [`SupervisorError::Pool`] if the worker threads cannot be created.
    pub fn build(self) -> Result<Arc<Supervisor>, SupervisorError> {
        let sup = Arc::new(Supervisor::new_internal(self.cfg)?);
        if let Some(ambient) = self.ambient {
            ambient.install(Arc::clone(&sup));
        }
        Ok(sup)
    }
}
