//! GPIO input raising an EXTI interrupt on one edge.

use hal::gpio::{self, Edge, Pull};

use crate::pinout::PinDef;

pub struct ExtiInput {
    line: u8,
}

impl ExtiInput {
    pub fn new(def: &PinDef, pull: Pull, edge: Edge) -> Self {
        let mut pin = def.init();
        pin.pull(pull);
        pin.enable_interrupt(edge);
        ExtiInput { line: def.pin() }
    }

    /// Acknowledge the pending EXTI flag. Call first thing in the handler.
    #[inline(always)]
    pub fn clear(&self) {
        gpio::clear_exti_interrupt(self.line);
    }
}
