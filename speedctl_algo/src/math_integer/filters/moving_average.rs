// Implements the integer moving-average filter used to turn per-tick pulse counts into a
// smoothed speed measurement.

// Key Features:
// - Window of 1..=MAX_WINDOW samples chosen at run time, storage fixed at compile time.
// - Running sum kept in u64, exact for any u32 input, no drift.
// - Truncating division: output = floor(sum / window).

// Detailed Operation:
// Every push replaces the oldest slot and adjusts the running sum by (new - oldest). The mean is
// always taken over the full window, including slots that were never written; these start at
// zero, so the first window-1 outputs under-report the speed (warm-up bias).
// For power-of-two windows the compiler lowers the division to a shift; the rounding is the
// same (toward zero) in both cases.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::math_integer::fifo_buffer::BufferFIFO;

/// Largest supported averaging window.
pub const MAX_WINDOW: usize = 32;

/// Moving average over the last `window` pulse counts.
pub struct MovingAverageFilter {
    samples: BufferFIFO<u32, MAX_WINDOW>, // Last `window` raw samples
    sum: u64,                             // Sum of all slots in use
    pushed: usize,                        // Pushes since reset, saturating at window
    output: u32,                          // Last computed average
}

impl MovingAverageFilter {
    /// Creates a zero-filled filter. Returns `None` if `window` is 0 or above `MAX_WINDOW`.
    pub fn new(window: usize) -> Option<Self> {
        Some(Self {
            samples: BufferFIFO::with_len(window)?,
            sum: 0,
            pushed: 0,
            output: 0,
        })
    }

    /// Math call: adds one raw sample and returns floor(mean of the window).
    pub fn push(&mut self, sample: u32) -> u32 {
        let oldest = self.samples.pop(sample);
        self.sum = self.sum - oldest as u64 + sample as u64;

        if self.pushed < self.samples.len() {
            self.pushed += 1;
        }

        // Quotient of N u32 values divided by N always fits back into u32
        self.output = (self.sum / self.samples.len() as u64) as u32;
        self.output
    }

    /// Last averaged value.
    pub fn average(&self) -> u32 {
        self.output
    }

    pub fn window(&self) -> usize {
        self.samples.len()
    }

    /// True once every slot holds a real sample, i.e. the warm-up bias is gone.
    pub fn is_warm(&self) -> bool {
        self.pushed == self.samples.len()
    }

    /// Zeroes all slots; the warm-up transient starts over.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.sum = 0;
        self.pushed = 0;
        self.output = 0;
    }
}
