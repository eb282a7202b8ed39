// Implements a floating-point PID controller with output clamping and conditional-integration
// anti-windup, used to turn a speed error into a PWM duty command.

// Key Features:
// - Configurable proportional, integral and derivative gains.
// - Rectangular (forward Euler) integration of error over a fixed time step.
// - Derivative on error or on measurement, selectable.
// - Output clamped to [out_min, out_max]; the integral is frozen while the output is
//   saturated in the direction the error pushes.

// Detailed Operation:
// dt is fixed for the lifetime of the controller; its reciprocal is computed once and the
// derivative term multiplies by it instead of dividing every tick. In f32 this changes the
// result by at most one ulp compared to a division. The first update after construction or
// reset has no previous sample, so it contributes no derivative term.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Source of the derivative term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DerivativeMode {
    /// d/dt of the error. Setpoint steps produce a derivative kick.
    #[default]
    OnError,
    /// -d/dt of the measurement. Insensitive to setpoint steps.
    OnMeasurement,
}

/// Implements the PID controller for closed-loop speed control.
pub struct PID {
    kp: f32, // Proportional gain.
    ki: f32, // Integral gain.
    kd: f32, // Derivative gain.

    inv_dt: f32, // 1 / dt, precomputed from the fixed time step.

    out_min: f32, // Output lower bound.
    out_max: f32, // Output upper bound.

    mode: DerivativeMode,

    integral: f32,         // Accumulated integral of error (error * seconds).
    previous_error: f32,   // Error of the previous update.
    previous_measure: f32, // Measurement of the previous update.
    primed: bool,          // True once a previous sample exists.
    saturated: bool,       // Output was clamped on the last update.
    output: f32,           // Last output.
}

impl PID {
    /// Creates a new PID controller with specified gains and a fixed time step.
    ///
    /// Output bounds default to `[f32::MIN, f32::MAX]`; use [`PID::with_output_limits`].
    /// The caller guarantees `dt > 0`; [`crate::config::ControlLoopConfig::validate`] checks it.
    pub fn new(kp: f32, ki: f32, kd: f32, dt: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            inv_dt: 1.0 / dt,
            out_min: f32::MIN,
            out_max: f32::MAX,
            mode: DerivativeMode::OnError,
            integral: 0.0,
            previous_error: 0.0,
            previous_measure: 0.0,
            primed: false,
            saturated: false,
            output: 0.0,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Select the derivative source.
    pub fn with_derivative_mode(mut self, mode: DerivativeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Runs one control step and returns the clamped correction.
    ///
    /// `dt` must equal the step given at construction; a different value only affects the
    /// integral term, the derivative keeps using the precomputed reciprocal.
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        let error = setpoint - measurement;

        // Proportional term
        let p = self.kp * error;

        // Integral candidate, committed only if the output is not pushed further into saturation
        let integral = self.integral + error * dt;

        // Derivative term
        let d = if self.primed {
            let slope = match self.mode {
                DerivativeMode::OnError => (error - self.previous_error) * self.inv_dt,
                DerivativeMode::OnMeasurement => (self.previous_measure - measurement) * self.inv_dt,
            };
            self.kd * slope
        } else {
            0.0
        };

        let unclamped = p + self.ki * integral + d;
        let output = unclamped.clamp(self.out_min, self.out_max);

        self.saturated = output != unclamped;
        let winding_up = (unclamped > self.out_max && error > 0.0)
            || (unclamped < self.out_min && error < 0.0);
        if !winding_up {
            self.integral = integral;
        }

        self.previous_error = error;
        self.previous_measure = measurement;
        self.primed = true;
        self.output = output;
        output
    }

    /// Clears integral and derivative memory. Gains and limits are kept.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.previous_measure = 0.0;
        self.primed = false;
        self.saturated = false;
        self.output = 0.0;
    }

    /// Retrieves the last output of the PID controller.
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Current integral accumulator (error * seconds, before Ki).
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// True if the last output was clamped.
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }
}
