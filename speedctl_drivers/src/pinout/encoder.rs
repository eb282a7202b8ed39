use super::PinDef;
use super::{PinMode, Port};

/// Single-channel encoder output, EXTI line 6 (EXTI9_5 vector)
pub const PULSE: PinDef = PinDef {
    port: Port::B,
    pin: 6,
    mode: PinMode::Input,
};
