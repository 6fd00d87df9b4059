//! Stage sequencer: homing, moves and profile updates over a [`Controller`].

use std::net::TcpStream;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use tracing::{debug, info, warn};

use crate::config::units::{Millimeters, Steps};
use crate::config::{MotionSettings, StageConfig, StageMechanics};
use crate::controller::{registers, Controller};
use crate::error::{ConfigError, MotionError, Result};
use crate::transport::Link;

use super::delay::StdDelay;
use super::profile::MotionProfile;

/// Trip output armed for the duration of a configured move.
const TRIP_ARMED: i64 = 2;
/// Trip output disabled.
const TRIP_DISABLED: i64 = 0;

/// A linear stage driven by one MCode controller.
///
/// Generic over:
/// - `S`: byte stream under the controller (`TcpStream` in production)
/// - `D`: delay provider used between `MV` polls (must implement `DelayNs`)
///
/// Every operation blocks until the controller has acknowledged each command
/// it sends; the waiting operations additionally block until `MV` reads 0.
pub struct Stage<S: Link = TcpStream, D: DelayNs = StdDelay> {
    controller: Controller<S>,
    mechanics: StageMechanics,
    settings: MotionSettings,
    delay: D,
}

impl<S: Link, D: DelayNs> Stage<S, D> {
    /// Wrap a connected controller.
    pub fn new(
        controller: Controller<S>,
        mechanics: StageMechanics,
        settings: MotionSettings,
        delay: D,
    ) -> Self {
        Self {
            controller,
            mechanics,
            settings,
            delay,
        }
    }

    /// Wrap a connected controller using the stage and motion sections of `config`.
    pub fn from_config(controller: Controller<S>, config: &StageConfig, delay: D) -> Self {
        Self::new(
            controller,
            config.stage.clone(),
            config.motion.clone(),
            delay,
        )
    }

    /// The controller.
    pub fn controller(&self) -> &Controller<S> {
        &self.controller
    }

    /// The controller, for raw commands.
    pub fn controller_mut(&mut self) -> &mut Controller<S> {
        &mut self.controller
    }

    /// Stage mechanics used for unit conversion.
    pub fn mechanics(&self) -> &StageMechanics {
        &self.mechanics
    }

    /// Move and wait parameters.
    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    /// Release the controller.
    pub fn into_controller(self) -> Controller<S> {
        self.controller
    }

    /// Block until the controller reports no motion.
    ///
    /// Waits the settle delay, then polls `MV` every poll interval. Polling time
    /// is accumulated from the intervals slept, not read from a clock.
    ///
    /// # Errors
    ///
    /// [`MotionError::WaitTimeout`] once the accumulated polling time reaches
    /// the configured maximum with the stage still moving.
    pub fn wait_until_stopped(&mut self) -> Result<()> {
        let poll_interval = self.settings.poll_interval();
        let max_wait = self.settings.max_wait();

        sleep(&mut self.delay, self.settings.settle());

        let mut waited = Duration::ZERO;
        while self.controller.is_moving()? {
            if waited >= max_wait {
                warn!(parent: self.controller.transport().span(), ?max_wait, "stage still moving");
                return Err(MotionError::WaitTimeout(max_wait).into());
            }
            sleep(&mut self.delay, poll_interval);
            waited += poll_interval;
        }

        debug!(parent: self.controller.transport().span(), ?waited, "stage stopped");
        Ok(())
    }

    /// Run the homing routine, wait for it to finish, then zero the counter.
    pub fn home(&mut self) -> Result<()> {
        info!(parent: self.controller.transport().span(), "homing");
        self.controller.home()?;
        self.wait_until_stopped()?;
        self.controller.set_counter(0)
    }

    /// Current position from the counter.
    pub fn position(&mut self) -> Result<Millimeters> {
        let counter = self.controller.counter()?;
        Ok(self.mechanics.to_mm(Steps(counter)))
    }

    /// Read the profile registers and convert them to millimeters.
    pub fn read_profile(&mut self) -> Result<MotionProfile> {
        let max_velocity = self.controller.max_velocity()?;
        let initial_velocity = self.controller.initial_velocity()?;
        let acceleration = self.controller.acceleration()?;
        let deceleration = self.controller.deceleration()?;
        let trip_position = self.controller.trip_position()?;

        let m = &self.mechanics;
        Ok(MotionProfile {
            max_velocity: m.velocity_to_mm(max_velocity),
            initial_velocity: m.velocity_to_mm(initial_velocity),
            acceleration: m.acceleration_to_mm(acceleration),
            deceleration: m.acceleration_to_mm(deceleration),
            trip_position: m.to_mm(trip_position),
        })
    }

    /// Send the setup commands, write the profile registers, then disable the trip.
    ///
    /// Stops at the first failing command; earlier writes stay applied.
    pub fn apply_profile<C: AsRef<str>>(
        &mut self,
        profile: &MotionProfile,
        setup: &[C],
    ) -> Result<()> {
        for command in setup {
            self.controller.send_command(command.as_ref())?;
        }

        let m = &self.mechanics;
        let max_velocity = m.velocity_to_steps(profile.max_velocity);
        let initial_velocity = m.velocity_to_steps(profile.initial_velocity);
        let acceleration = m.acceleration_to_steps(profile.acceleration);
        let deceleration = m.acceleration_to_steps(profile.deceleration);
        let trip_position = m.to_steps(profile.trip_position);

        self.controller.set_max_velocity(max_velocity)?;
        self.controller.set_initial_velocity(initial_velocity)?;
        self.controller.set_acceleration(acceleration)?;
        self.controller.set_deceleration(deceleration)?;
        self.controller.set_trip_position(trip_position)?;
        self.controller
            .write_variable(registers::TRIP_ENABLE, TRIP_DISABLED)?;

        info!(
            parent: self.controller.transport().span(),
            max_velocity, initial_velocity, acceleration, deceleration,
            trip_position = trip_position.value(),
            "profile applied"
        );
        Ok(())
    }

    /// Move to `target` from home with the trip armed, then return home.
    ///
    /// The stage is homed first if the counter is not zero. Returns the target
    /// actually used, which differs from `target` only under a clamping limit.
    ///
    /// # Errors
    ///
    /// - [`MotionError::LimitExceeded`] if a rejecting soft limit excludes `target`
    /// - [`MotionError::NotHomed`] if the counter is still non-zero after homing
    pub fn execute_move(&mut self, target: Millimeters) -> Result<Millimeters> {
        let target = self.check_limits(target)?;

        if self.controller.counter()? != 0 {
            self.home()?;
        }
        let counter = self.controller.counter()?;
        if counter != 0 {
            return Err(MotionError::NotHomed { counter }.into());
        }

        let steps = self.mechanics.to_steps(target);
        info!(
            parent: self.controller.transport().span(),
            target_mm = target.0, steps = steps.value(), "absolute move"
        );

        self.controller
            .write_variable(registers::TRIP_ENABLE, TRIP_ARMED)?;
        self.controller.move_absolute(steps)?;
        self.wait_until_stopped()?;
        self.controller
            .write_variable(registers::TRIP_ENABLE, TRIP_DISABLED)?;
        self.home()?;

        Ok(target)
    }

    /// [`execute_move`](Self::execute_move) to the configured move length.
    pub fn execute_configured_move(&mut self) -> Result<Millimeters> {
        self.execute_move(self.settings.move_length)
    }

    /// Start a relative move. Does not wait.
    pub fn jog(&mut self, distance: Millimeters) -> Result<Steps> {
        let steps = self.mechanics.to_steps(distance);
        debug!(
            parent: self.controller.transport().span(),
            distance_mm = distance.0, steps = steps.value(), "jog"
        );
        self.controller.move_relative(steps)?;
        Ok(steps)
    }

    /// Jog forward by the configured step length.
    pub fn step_forward(&mut self) -> Result<Steps> {
        self.jog(self.settings.step_length)
    }

    /// Jog backward by the configured step length.
    pub fn step_backward(&mut self) -> Result<Steps> {
        self.jog(-self.settings.step_length)
    }

    /// Check that the controller's `MS` matches the configured microsteps.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MicrostepMismatch`] if they differ.
    pub fn verify_microsteps(&mut self) -> Result<()> {
        let expected = self.mechanics.microsteps.value();
        let actual = self.controller.microsteps()?;
        if actual != i64::from(expected) {
            return Err(ConfigError::MicrostepMismatch { expected, actual }.into());
        }
        Ok(())
    }

    fn check_limits(&self, target: Millimeters) -> Result<Millimeters> {
        let Some(limits) = &self.mechanics.limits else {
            return Ok(target);
        };
        limits.apply(target).ok_or_else(|| {
            MotionError::LimitExceeded {
                target: target.0,
                min: limits.min.0,
                max: limits.max.0,
            }
            .into()
        })
    }
}

fn sleep<D: DelayNs>(delay: &mut D, duration: Duration) {
    let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    if ms > 0 {
        delay.delay_ms(ms);
    }
}
