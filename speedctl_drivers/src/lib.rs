// Board support for the speed controller: pin map, PWM output, tick timer and edge input.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![no_std]

pub mod exti_input;
pub mod pinout;
pub mod pwm;
pub mod tick;
