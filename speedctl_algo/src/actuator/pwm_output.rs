//! [`DutyActuator`] over any `embedded-hal` PWM channel.

use embedded_hal::pwm::SetDutyCycle;

use super::{check_duty, ActuationError, DutyActuator, DutyCycle};

/// Adapts an `embedded_hal::pwm::SetDutyCycle` channel to the loop's actuator contract.
pub struct PwmOutput<P> {
    pwm: P,
    duty: DutyCycle, // Last value accepted by the channel
}

impl<P: SetDutyCycle> PwmOutput<P> {
    /// Wraps `pwm` and forces it to zero duty.
    pub fn new(mut pwm: P) -> Result<Self, ActuationError> {
        pwm.set_duty_cycle_fully_off()
            .map_err(|_| ActuationError::Fault)?;
        Ok(Self { pwm, duty: 0 })
    }

    /// Last applied compare value.
    pub fn duty(&self) -> DutyCycle {
        self.duty
    }

    pub fn free(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> DutyActuator for PwmOutput<P> {
    fn max_duty(&self) -> DutyCycle {
        self.pwm.max_duty_cycle()
    }

    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), ActuationError> {
        let duty = check_duty(duty, self.pwm.max_duty_cycle())?;
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuationError::Fault)?;
        self.duty = duty;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::{ErrorKind, ErrorType};

    struct FakeChannel {
        max: u16,
        duty: u16,
        writes: usize,
    }

    impl ErrorType for FakeChannel {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakeChannel {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            self.writes += 1;
            Ok(())
        }
    }

    struct BrokenChannel;

    impl ErrorType for BrokenChannel {
        type Error = ErrorKind;
    }

    impl SetDutyCycle for BrokenChannel {
        fn max_duty_cycle(&self) -> u16 {
            100
        }

        fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn starts_fully_off() {
        let out = PwmOutput::new(FakeChannel { max: 127, duty: 64, writes: 0 }).unwrap();
        assert_eq!(out.duty(), 0);
        let channel = out.free();
        assert_eq!(channel.duty, 0);
        assert_eq!(channel.writes, 1);
    }

    #[test]
    fn rejects_duty_above_period_without_writing() {
        let mut out = PwmOutput::new(FakeChannel { max: 127, duty: 0, writes: 0 }).unwrap();
        assert_eq!(out.max_duty(), 127);
        assert_eq!(
            out.set_duty_cycle(128),
            Err(ActuationError::OutOfRange { requested: 128, max: 127 })
        );
        out.set_duty_cycle(127).unwrap();
        let channel = out.free();
        assert_eq!(channel.duty, 127);
        assert_eq!(channel.writes, 2);
    }

    #[test]
    fn channel_errors_map_to_fault() {
        assert_eq!(PwmOutput::new(BrokenChannel).err(), Some(ActuationError::Fault));
    }
}
