//! H-bridge pins driven by the speed loop.
use super::PinDef;
use super::{PinMode, Port};

/// Direction input of the bridge. Held low: the loop only drives forward.
pub const DIR: PinDef = PinDef {
    port: Port::B,
    pin: 2,
    mode: PinMode::Output,
};

/// Enable input of the bridge
pub const ENABLE: PinDef = PinDef {
    port: Port::A,
    pin: 4,
    mode: PinMode::Output,
};

/// Speed command, TIM2_CH1
pub const PWM: PinDef = PinDef {
    port: Port::A,
    pin: 0,
    mode: PinMode::Alt(1),
};
