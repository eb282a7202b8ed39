// Implements the PulseCounter, the single piece of state shared between the encoder edge
// interrupt and the control tick interrupt.

// Key Features:
// - Lock-free: one atomic increment per edge, one atomic swap per tick.
// - Const constructor, so the counter can live in a `static` without lazy init.
// - 32-bit wrapping count.

// Detailed Operation:
// The edge context calls `record_edge()` which performs `fetch_add(1)`. The tick context calls
// `take_and_reset()` which performs `swap(0)`. Both are single read-modify-write instructions
// (LDREX/STREX on Cortex-M4), so an edge that races with the swap is accounted either in the
// value returned now or in the value returned on the next tick, never both and never neither.
//
// Width: u32. The loop is designed for at most `MAX_EDGES_PER_TICK` edges per tick
// (10 MHz edge rate at a 10 ms tick), far below the wrap point. If the counter ever wraps the
// result is still the count modulo 2^32, as `fetch_add` wraps.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::sync::atomic::{AtomicU32, Ordering};

/// Edges per tick the controller is dimensioned for.
pub const MAX_EDGES_PER_TICK: u32 = 100_000;

/// Accumulates encoder edges between two control ticks.
pub struct PulseCounter {
    count: AtomicU32, // Edges recorded since the last take_and_reset()
}

impl PulseCounter {
    /// Creates a counter starting at zero.
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Edge-context callback: registers one encoder edge.
    #[inline(always)]
    pub fn record_edge(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Tick-context read: returns edges since the previous call and restarts from zero.
    #[inline(always)]
    pub fn take_and_reset(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Current count without resetting it.
    pub fn peek(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_returns_edges_since_previous_take() {
        let counter = PulseCounter::new();
        for _ in 0..7 {
            counter.record_edge();
        }
        assert_eq!(counter.take_and_reset(), 7);

        counter.record_edge();
        counter.record_edge();
        assert_eq!(counter.take_and_reset(), 2);
        assert_eq!(counter.take_and_reset(), 0);
    }

    #[test]
    fn peek_does_not_reset() {
        let counter = PulseCounter::new();
        counter.record_edge();
        assert_eq!(counter.peek(), 1);
        assert_eq!(counter.peek(), 1);
        assert_eq!(counter.take_and_reset(), 1);
        assert_eq!(counter.peek(), 0);
    }

    #[test]
    fn count_wraps_at_u32_width() {
        let counter = PulseCounter {
            count: AtomicU32::new(u32::MAX),
        };
        counter.record_edge();
        assert_eq!(counter.take_and_reset(), 0);
    }

    #[test]
    fn usable_from_static() {
        static PULSES: PulseCounter = PulseCounter::new();
        PULSES.record_edge();
        assert_eq!(PULSES.take_and_reset(), 1);
    }

    #[test]
    fn concurrent_edges_are_neither_lost_nor_duplicated() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;
        use std::thread;

        const PRODUCERS: u32 = 4;
        const EDGES_PER_PRODUCER: u32 = 50_000;

        let counter = Arc::new(PulseCounter::new());
        let done = Arc::new(AtomicBool::new(false));

        let consumer = {
            let counter = Arc::clone(&counter);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut total: u64 = 0;
                while !done.load(Ordering::Acquire) {
                    total += counter.take_and_reset() as u64;
                }
                total + counter.take_and_reset() as u64
            })
        };

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..EDGES_PER_PRODUCER {
                        counter.record_edge();
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }
        done.store(true, Ordering::Release);

        let total = consumer.join().unwrap();
        assert_eq!(total, (PRODUCERS * EDGES_PER_PRODUCER) as u64);
    }
}
