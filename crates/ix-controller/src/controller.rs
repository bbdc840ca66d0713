//! The `Controller` trait — the main extension point for interaction scripts.

use ix_arbiter::Revocation;
use ix_core::IxResult;
use ix_input::ActionKey;
use ix_timer::{TimerHandle, TimerParams};

use crate::{InteractionEvent, TickContext};

/// A cooperative unit of interaction logic driven by the frame scheduler.
///
/// Every hook runs on the scheduler's tick and must return promptly: waiting
/// is expressed as state plus a timer, never as a loop.  Returning `Err` (or
/// panicking) from any hook ends this controller only; the scheduler releases
/// whatever it owned and carries on with the others.
///
/// # Required methods
///
/// Only [`name`][Self::name] and [`process`][Self::process] are required.
/// The remaining hooks default to no-ops.
///
/// # Example
///
/// ```rust,ignore
/// struct Blinker { vehicle: EntityHandle, on: bool }
///
/// impl Controller for Blinker {
///     fn name(&self) -> &str { "blinker" }
///
///     fn on_start(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()> {
///         ctx.request_ownership(self.vehicle)?;
///         ctx.schedule(TimerSpec::every(Delay::Millis(500)))?;
///         Ok(())
///     }
///
///     fn process(&mut self, _ctx: &mut TickContext<'_>) -> IxResult<()> { Ok(()) }
///
///     fn on_timer(&mut self, ctx: &mut TickContext<'_>, _: TimerHandle, _: &TimerParams) -> IxResult<()> {
///         self.on = !self.on;
///         ctx.command(self.vehicle, WorldCommand::SetLights(self.on))
///     }
/// }
/// ```
pub trait Controller {
    /// Short label used in logs and reports.
    fn name(&self) -> &str;

    /// Keys this controller reads from the input frame.  Bound into the
    /// scheduler's input tracker before the controller's first tick.
    fn input_keys(&self) -> Vec<ActionKey> {
        Vec::new()
    }

    /// Called once, at the start of the tick after registration.
    fn on_start(&mut self, _ctx: &mut TickContext<'_>) -> IxResult<()> {
        Ok(())
    }

    /// Called exactly once per tick while the controller is registered.
    fn process(&mut self, ctx: &mut TickContext<'_>) -> IxResult<()>;

    /// A timer scheduled with [`TickContext::schedule`] fired.
    fn on_timer(
        &mut self,
        _ctx:    &mut TickContext<'_>,
        _timer:  TimerHandle,
        _params: &TimerParams,
    ) -> IxResult<()> {
        Ok(())
    }

    /// An event of a subscribed kind was published on an earlier phase.
    fn on_event(&mut self, _ctx: &mut TickContext<'_>, _event: &InteractionEvent) -> IxResult<()> {
        Ok(())
    }

    /// The arbiter revoked one of this controller's claims.
    fn on_ownership_lost(
        &mut self,
        _ctx:        &mut TickContext<'_>,
        _revocation: &Revocation,
    ) -> IxResult<()> {
        Ok(())
    }

    /// Called once when the controller leaves the scheduler, however it ends.
    /// Claims, timers and subscriptions are dropped right after this returns.
    fn on_end(&mut self, _ctx: &mut TickContext<'_>) -> IxResult<()> {
        Ok(())
    }
}

/// A detached timer callback: fires without belonging to any controller.
///
/// Everything the callback needs arrives in `params` or lives in the
/// callback object itself.  A failure is logged and reported as
/// `IxError::TimerCallbackFault`; it never affects other callbacks.
pub trait TimerCallback {
    fn fire(&mut self, ctx: &mut TickContext<'_>, params: &TimerParams) -> IxResult<()>;
}

/// A controller that does nothing and never ends on its own.
///
/// Useful as a placeholder in tests and for reserving a controller id.
pub struct NoopController;

impl Controller for NoopController {
    fn name(&self) -> &str {
        "noop"
    }

    fn process(&mut self, _ctx: &mut TickContext<'_>) -> IxResult<()> {
        Ok(())
    }
}
