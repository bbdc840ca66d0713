//! The host-side collaborators handed to every tick.

use ix_input::InputSource;
use ix_world::{Presentation, World};

/// Borrowed host interfaces for one call to `FrameScheduler::tick`.
///
/// The scheduler owns none of these; the host rebuilds a `Host` whenever it
/// is convenient (typically once per frame).
pub struct Host<'a> {
    pub world:        &'a mut dyn World,
    pub input:        &'a mut dyn InputSource,
    pub presentation: &'a mut dyn Presentation,
}

impl<'a> Host<'a> {
    pub fn new(
        world:        &'a mut dyn World,
        input:        &'a mut dyn InputSource,
        presentation: &'a mut dyn Presentation,
    ) -> Self {
        Self { world, input, presentation }
    }
}
