#![allow(dead_code)]

use speedctl_algo::actuator::{check_duty, ActuationError, DutyActuator, DutyCycle};

/// Records every duty write, optionally failing some of them.
pub struct RecordingPwm {
    pub period: DutyCycle,
    pub duty: DutyCycle,
    pub writes: Vec<DutyCycle>,
    /// Fail write number n (0-based) when `fail_every` divides n + 1.
    pub fail_every: Option<usize>,
}

impl RecordingPwm {
    pub fn new(period: DutyCycle) -> Self {
        Self {
            period,
            duty: 0,
            writes: Vec::new(),
            fail_every: None,
        }
    }

    pub fn failing_every(period: DutyCycle, n: usize) -> Self {
        Self {
            fail_every: Some(n),
            ..Self::new(period)
        }
    }
}

impl DutyActuator for RecordingPwm {
    fn max_duty(&self) -> DutyCycle {
        self.period
    }

    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), ActuationError> {
        let attempt = self.writes.len() + 1;
        self.writes.push(duty);
        if matches!(self.fail_every, Some(n) if attempt % n == 0) {
            return Err(ActuationError::Fault);
        }
        self.duty = check_duty(duty, self.period)?;
        Ok(())
    }
}

/// First-order DC motor: speed (edges per tick) follows `gain * duty` with smoothing `alpha`.
pub struct MotorModel {
    pub gain: f32,
    pub alpha: f32,
    pub speed: f32,
    carry: f32,
}

impl MotorModel {
    pub fn new(gain: f32, alpha: f32) -> Self {
        Self {
            gain,
            alpha,
            speed: 0.0,
            carry: 0.0,
        }
    }

    /// Whole edges produced during one tick at the current speed.
    pub fn edges(&mut self) -> u32 {
        let exact = self.speed + self.carry;
        let whole = exact as u32;
        self.carry = exact - whole as f32;
        whole
    }

    /// Advance the speed by one tick under `duty`.
    pub fn drive(&mut self, duty: DutyCycle) {
        self.speed += (self.gain * duty as f32 - self.speed) * self.alpha;
    }
}
