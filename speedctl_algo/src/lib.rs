#![cfg_attr(not(test), no_std)]

// Must come first: the log macros are textually scoped
mod fmt;

pub mod actuator;
pub mod config;
pub mod encoder_pulses;
pub mod math_float;
pub mod math_integer;

use actuator::{ActuationError, DutyActuator, DutyCycle};
use config::{ConfigError, ControlLoopConfig};
use encoder_pulses::PulseCounter;
use math_float::controllers::pid::PID;
use math_integer::filters::moving_average::MovingAverageFilter;

/// Whether the loop is driving the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Every tick runs the full pipeline and writes the duty cycle.
    Running,
    /// Output parked at zero duty; ticks only drain the pulse counter.
    Stopped,
}

/// What one tick measured and commanded.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub tick: u32,                    // Sequence number, wraps
    pub raw: u32,                     // Edges counted during the tick
    pub filtered: u32,                // Moving average fed to the PID
    pub correction: f32,              // Clamped PID output
    pub duty: DutyCycle,              // Compare value sent to the actuator
    pub fault: Option<ActuationError>, // Set if the actuator rejected the write
}

/// Closed-loop speed controller: pulse counter -> moving average -> PID -> PWM duty.
///
/// `on_tick` runs in the tick interrupt; `record_edge` (or the shared [`PulseCounter`] itself)
/// in the edge interrupt.
pub struct SpeedLoop<'a, A: DutyActuator> {
    pulses: &'a PulseCounter, // Shared with the edge interrupt
    filter: MovingAverageFilter,
    pid: PID,
    actuator: A,

    config: ControlLoopConfig,
    setpoint: f32, // Live target, starts at config.setpoint
    state: LoopState,

    ticks: u32,  // Ticks executed while running
    faults: u32, // Rejected duty writes
    last: Option<TickReport>,
}

impl<'a, A: DutyActuator> SpeedLoop<'a, A> {
    /// Create a new speed loop.
    ///
    /// # Arguments
    /// * `config` - Loop tuning, validated here against the actuator's period
    /// * `pulses` - Counter incremented by the encoder edge interrupt
    /// * `actuator` - PWM output; nothing else may write its duty cycle afterwards
    pub fn new(
        config: ControlLoopConfig,
        pulses: &'a PulseCounter,
        actuator: A,
    ) -> Result<Self, ConfigError> {
        config.validate_for(actuator.max_duty())?;

        let filter = MovingAverageFilter::new(config.filter_window).ok_or(
            ConfigError::WindowTooLarge {
                requested: config.filter_window,
                capacity: math_integer::filters::moving_average::MAX_WINDOW,
            },
        )?;

        let pid = PID::new(config.kp, config.ki, config.kd, config.tick_period_s)
            .with_output_limits(config.duty_min as f32, config.duty_max as f32)
            .with_derivative_mode(config.derivative);

        info!(
            "speed loop: dt {} s, window {}, setpoint {}, duty {}..{}",
            config.tick_period_s,
            config.filter_window,
            config.setpoint,
            config.duty_min,
            config.duty_max
        );

        Ok(Self {
            pulses,
            filter,
            pid,
            actuator,
            config,
            setpoint: config.setpoint,
            state: LoopState::Running,
            ticks: 0,
            faults: 0,
            last: None,
        })
    }

    /// Edge-context callback.
    #[inline(always)]
    pub fn record_edge(&self) {
        self.pulses.record_edge();
    }

    /// Tick-context callback: runs one control step.
    ///
    /// Returns `None` when stopped (the counter is still drained so that stale edges do not
    /// leak into the first sample after `resume`).
    pub fn on_tick(&mut self) -> Option<TickReport> {
        let raw = self.pulses.take_and_reset();
        if self.state == LoopState::Stopped {
            return None;
        }

        let filtered = self.filter.push(raw);
        let correction = self
            .pid
            .update(self.setpoint, filtered as f32, self.config.tick_period_s);
        let duty = self.correction_to_duty(correction);

        let fault = match self.actuator.set_duty_cycle(duty) {
            Ok(()) => None,
            Err(err) => {
                self.faults = self.faults.wrapping_add(1);
                warn!("duty write {} rejected: {}", duty, err);
                Some(err)
            }
        };

        let report = TickReport {
            tick: self.ticks,
            raw,
            filtered,
            correction,
            duty,
            fault,
        };
        self.ticks = self.ticks.wrapping_add(1);

        if self.config.log_every != 0 && report.tick % self.config.log_every == 0 {
            debug!(
                "tick {}: raw {} filtered {} duty {}",
                report.tick, raw, filtered, duty
            );
        }

        self.last = Some(report);
        Some(report)
    }

    /// Change the target speed (edges per tick) without touching the controller memory.
    pub fn set_setpoint(&mut self, setpoint: f32) -> Result<(), ConfigError> {
        config::validate_setpoint(setpoint)?;
        info!("setpoint {} -> {}", self.setpoint, setpoint);
        self.setpoint = setpoint;
        Ok(())
    }

    /// Park the output at zero duty and stop controlling.
    ///
    /// Interrupt sources are owned by the caller and must be masked there.
    pub fn shutdown(&mut self) -> Result<(), ActuationError> {
        self.state = LoopState::Stopped;
        self.pid.reset();
        self.filter.reset();
        info!("speed loop stopped after {} ticks", self.ticks);
        self.actuator.set_duty_cycle(0)
    }

    /// Restart control from a clean filter and controller.
    pub fn resume(&mut self) {
        self.pulses.take_and_reset();
        self.pid.reset();
        self.filter.reset();
        self.state = LoopState::Running;
        info!("speed loop resumed");
    }

    #[inline(always)]
    fn correction_to_duty(&self, correction: f32) -> DutyCycle {
        if !correction.is_finite() {
            return self.config.duty_min;
        }
        // Round half up; the float-to-int cast saturates
        let duty = (correction + 0.5) as DutyCycle;
        duty.clamp(self.config.duty_min, self.config.duty_max)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn config(&self) -> &ControlLoopConfig {
        &self.config
    }

    /// Report of the most recent running tick.
    pub fn last_report(&self) -> Option<TickReport> {
        self.last
    }

    /// Number of duty writes the actuator rejected.
    pub fn actuation_faults(&self) -> u32 {
        self.faults
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn filter(&self) -> &MovingAverageFilter {
        &self.filter
    }

    pub fn pid(&self) -> &PID {
        &self.pid
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Release the actuator.
    pub fn free(self) -> A {
        self.actuator
    }
}
