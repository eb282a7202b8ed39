//! Duty-cycle actuation sink used by the speed loop.
//!
//! The loop is the only caller of [`DutyActuator::set_duty_cycle`]; implementors own the PWM
//! compare register and are the only code allowed to write it.

use thiserror::Error;

pub mod pwm_output;
pub use pwm_output::PwmOutput;

/// PWM compare value, `0..=max_duty()`. Zero keeps the output low for the whole period.
pub type DutyCycle = u16;

/// Rejected duty-cycle write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuationError {
    /// Requested compare value exceeds the PWM period.
    #[error("duty {requested} exceeds period {max}")]
    OutOfRange {
        requested: DutyCycle,
        max: DutyCycle,
    },
    /// The underlying PWM peripheral reported an error.
    #[error("PWM output fault")]
    Fault,
}

/// PWM output the control loop drives.
pub trait DutyActuator {
    /// Compare value for 100 % duty (the PWM period in timer counts).
    fn max_duty(&self) -> DutyCycle;

    /// Applies `duty`. Values above [`DutyActuator::max_duty`] must be rejected with
    /// [`ActuationError::OutOfRange`] and leave the output unchanged.
    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), ActuationError>;
}

impl<T: DutyActuator + ?Sized> DutyActuator for &mut T {
    fn max_duty(&self) -> DutyCycle {
        T::max_duty(self)
    }

    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), ActuationError> {
        T::set_duty_cycle(self, duty)
    }
}

/// Range check shared by actuator implementations.
#[inline(always)]
pub fn check_duty(duty: DutyCycle, max: DutyCycle) -> Result<DutyCycle, ActuationError> {
    if duty > max {
        Err(ActuationError::OutOfRange {
            requested: duty,
            max,
        })
    } else {
        Ok(duty)
    }
}
