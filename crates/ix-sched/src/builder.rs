//! Fluent builder for constructing a [`FrameScheduler`].

use ix_controller::{Controller, SharedState};
use ix_core::{ControllerId, SchedulerConfig};

use crate::{FrameScheduler, SchedError, SchedResult};

/// Fluent builder for [`FrameScheduler`].
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                          |
/// |-------------------|----------------------------------|
/// | `.controller(c)`  | no controllers                   |
/// | `.shared(s)`      | `SharedState::default()`         |
///
/// Controllers passed here are registered in call order and start on the
/// first tick.
///
/// # Example
///
/// ```rust,ignore
/// let mut sched = SchedulerBuilder::new(SchedulerConfig::default().with_seed(7))
///     .controller(Box::new(DutyController::new(player, tuning.keys.duty)))
///     .build()?;
/// sched.tick(&mut Host::new(&mut world, &mut input, &mut presentation));
/// ```
pub struct SchedulerBuilder {
    config:      SchedulerConfig,
    controllers: Vec<Box<dyn Controller>>,
    shared:      Option<SharedState>,
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config, controllers: Vec::new(), shared: None }
    }

    /// Register `controller` at build time.
    pub fn controller(mut self, controller: Box<dyn Controller>) -> Self {
        self.controllers.push(controller);
        self
    }

    /// Start from pre-set shared flags (e.g. a host that begins on duty).
    pub fn shared(mut self, shared: SharedState) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Validate the configuration and return a scheduler with every
    /// controller queued for the first tick, plus their ids.
    pub fn build_with_ids(self) -> SchedResult<(FrameScheduler, Vec<ControllerId>)> {
        if self.config.tick_duration_ms == 0 {
            return Err(SchedError::Config("tick_duration_ms must be greater than zero".into()));
        }
        let mut sched = FrameScheduler::new(self.config, self.shared.unwrap_or_default());
        let ids = self
            .controllers
            .into_iter()
            .map(|c| sched.register_controller(c))
            .collect();
        Ok((sched, ids))
    }

    pub fn build(self) -> SchedResult<FrameScheduler> {
        self.build_with_ids().map(|(sched, _)| sched)
    }
}
