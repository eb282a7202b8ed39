use super::PinDef;
use super::{PinMode, Port};

/// Start/stop button, EXTI line 10 (EXTI15_10 vector)
pub const BUTTON: PinDef = PinDef {
    port: Port::A,
    pin: 10,
    mode: PinMode::Input,
};
