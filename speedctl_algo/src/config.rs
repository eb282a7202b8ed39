//! Session configuration of the speed loop.
//!
//! Built once at start-up, validated, then handed to [`crate::SpeedLoop::new`]; it is never
//! modified afterwards.

use thiserror::Error;

use crate::actuator::DutyCycle;
use crate::math_float::controllers::pid::DerivativeMode;
use crate::math_integer::filters::moving_average::MAX_WINDOW;

/// Default averaging window, in ticks.
pub const DEFAULT_WINDOW: usize = 8;

/// Rejected configuration. Fatal to start-up.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("tick period must be a positive number of seconds")]
    NonPositiveTickPeriod,
    #[error("filter window must hold at least one sample")]
    ZeroWindow,
    #[error("filter window {requested} exceeds capacity {capacity}")]
    WindowTooLarge { requested: usize, capacity: usize },
    #[error("PID gains must be finite and non-negative")]
    InvalidGain,
    #[error("setpoint must be finite and non-negative")]
    InvalidSetpoint,
    #[error("duty bounds inverted: min {min} > max {max}")]
    InvertedDutyBounds { min: DutyCycle, max: DutyCycle },
    #[error("duty max {max} exceeds PWM period {period}")]
    DutyAbovePeriod { max: DutyCycle, period: DutyCycle },
}

/// Tuning and timing of the speed loop.
///
/// `setpoint` is expressed in the unit the loop measures: averaged encoder edges per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlLoopConfig {
    /// Period of the tick interrupt in seconds; also the PID time step.
    pub tick_period_s: f32,
    /// Number of ticks averaged by the speed filter, `1..=MAX_WINDOW`.
    pub filter_window: usize,
    /// Target speed in edges per tick.
    pub setpoint: f32,
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Lowest compare value the loop will command.
    pub duty_min: DutyCycle,
    /// Highest compare value the loop will command.
    pub duty_max: DutyCycle,
    pub derivative: DerivativeMode,
    /// Emit a debug line every `log_every` ticks; 0 disables it.
    pub log_every: u32,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            tick_period_s: 0.01,
            filter_window: DEFAULT_WINDOW,
            setpoint: 0.0,
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            duty_min: 0,
            duty_max: 127,
            derivative: DerivativeMode::OnError,
            log_every: 100,
        }
    }
}

impl ControlLoopConfig {
    /// Set the tick period in seconds.
    pub fn with_tick_period(mut self, seconds: f32) -> Self {
        self.tick_period_s = seconds;
        self
    }

    /// Set the averaging window in ticks.
    pub fn with_window(mut self, window: usize) -> Self {
        self.filter_window = window;
        self
    }

    /// Set the target speed in edges per tick.
    pub fn with_setpoint(mut self, setpoint: f32) -> Self {
        self.setpoint = setpoint;
        self
    }

    /// Set PID gains.
    pub fn with_gains(mut self, kp: f32, ki: f32, kd: f32) -> Self {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self
    }

    /// Set duty-cycle limits (compare values).
    pub fn with_duty_limits(mut self, min: DutyCycle, max: DutyCycle) -> Self {
        self.duty_min = min;
        self.duty_max = max;
        self
    }

    pub fn with_derivative_mode(mut self, mode: DerivativeMode) -> Self {
        self.derivative = mode;
        self
    }

    pub fn with_log_every(mut self, ticks: u32) -> Self {
        self.log_every = ticks;
        self
    }

    /// Checks every field that does not depend on the actuator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_period_s.is_finite() && self.tick_period_s > 0.0) {
            return Err(ConfigError::NonPositiveTickPeriod);
        }
        if self.filter_window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.filter_window > MAX_WINDOW {
            return Err(ConfigError::WindowTooLarge {
                requested: self.filter_window,
                capacity: MAX_WINDOW,
            });
        }
        if [self.kp, self.ki, self.kd]
            .iter()
            .any(|gain| !(gain.is_finite() && *gain >= 0.0))
        {
            return Err(ConfigError::InvalidGain);
        }
        validate_setpoint(self.setpoint)?;
        if self.duty_min > self.duty_max {
            return Err(ConfigError::InvertedDutyBounds {
                min: self.duty_min,
                max: self.duty_max,
            });
        }
        Ok(())
    }

    /// [`ControlLoopConfig::validate`] plus the duty range against an actuator's period.
    pub fn validate_for(&self, period: DutyCycle) -> Result<(), ConfigError> {
        self.validate()?;
        if self.duty_max > period {
            return Err(ConfigError::DutyAbovePeriod {
                max: self.duty_max,
                period,
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_setpoint(setpoint: f32) -> Result<(), ConfigError> {
    if setpoint.is_finite() && setpoint >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetpoint)
    }
}

/// Update period of a timer counting `reload + 1` cycles of a `clock_hz` clock.
///
/// A 32 768 Hz clock with reload 327 gives 10.009 ms.
pub fn tick_period_from_timer(clock_hz: u32, reload: u32) -> f32 {
    (reload as f32 + 1.0) / clock_hz as f32
}
