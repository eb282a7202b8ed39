#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

use hal::{
    self,
    clocks::Clocks,
    gpio::{Edge, Pull},
    pac,
};

use speedctl_algo::{
    actuator::{DutyActuator, PwmOutput},
    config::ControlLoopConfig,
    encoder_pulses::PulseCounter,
    LoopState, SpeedLoop,
};

use cortex_m::peripheral::NVIC;

// Written by the edge interrupt, drained by the tick interrupt
static PULSES: PulseCounter = PulseCounter::new();

const PWM_FREQ: u16 = 20_000;
// 10 kHz counter, 100 counts: 10 ms control period
const TICK_COUNTER_HZ: u32 = 10_000;
const TICK_RELOAD: u16 = 99;

type Actuator = PwmOutput<speedctl_drivers::pwm::TimPWM>;

#[rtic::app(device = pac, peripherals = true)]
mod app {
    use super::*;

    use speedctl_drivers::*;

    #[shared]
    struct Shared {
        speed: SpeedLoop<'static, Actuator>,
    }

    #[local]
    struct Local {
        tick: tick::TickTimer,
        encoder: exti_input::ExtiInput,
        button: exti_input::ExtiInput,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let dp = ctx.device;
        let clock_cfg = Clocks::default();
        defmt::unwrap!(clock_cfg.setup().ok());

        let sysclk_freq = clock_cfg.sysclk(); // System clock frequency in Hz
        defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);
        init_driver_pins();

        let mut timer_pwm = pwm::TimPWM::new(dp.TIM2, &clock_cfg, PWM_FREQ);
        timer_pwm.begin();
        let actuator = defmt::unwrap!(PwmOutput::new(timer_pwm));

        // Full timer resolution: the reload of TIM2, not a fixed compare count
        let duty_max = actuator.max_duty();

        let mut tick = tick::TickTimer::new(dp.TIM3, &clock_cfg, TICK_COUNTER_HZ, TICK_RELOAD);

        let config = ControlLoopConfig::default()
            .with_tick_period(tick.period_s())
            .with_window(8)
            .with_setpoint(40.0)
            .with_gains(12.5, 500.0, 0.0) // duty counts per edge/tick
            .with_duty_limits(0, duty_max)
            .with_log_every(100);
        let speed = defmt::unwrap!(SpeedLoop::new(config, &PULSES, actuator));

        let encoder = exti_input::ExtiInput::new(&pinout::encoder::PULSE, Pull::Up, Edge::Rising);
        let button = exti_input::ExtiInput::new(&pinout::user::BUTTON, Pull::Up, Edge::Rising);

        tick.start();
        defmt::info!("SYSTEM: speed loop running");

        (Shared { speed }, Local { tick, encoder, button })
    }

    fn init_driver_pins() {
        // Forward only
        let mut dir = pinout::driver::DIR.init();
        dir.set_low();

        let mut dr_en = pinout::driver::ENABLE.init();
        dr_en.set_high();
    }

    // Encoder edge: must preempt the tick so no edge waits behind a control step
    #[task(binds = EXTI9_5, local = [encoder], priority = 2)]
    fn encoder_edge(cx: encoder_edge::Context) {
        cx.local.encoder.clear();
        PULSES.record_edge();
    }

    #[task(binds = TIM3, shared = [speed], local = [tick], priority = 1)]
    fn control_tick(mut cx: control_tick::Context) {
        cx.local.tick.clear();
        cx.shared.speed.lock(|speed| {
            speed.on_tick();
        });
    }

    // Toggles between running and parked
    #[task(binds = EXTI15_10, shared = [speed], local = [button], priority = 1)]
    fn start_stop(mut cx: start_stop::Context) {
        cx.local.button.clear();
        cx.shared.speed.lock(|speed| match speed.state() {
            LoopState::Running => {
                NVIC::mask(pac::Interrupt::TIM3);
                NVIC::mask(pac::Interrupt::EXTI9_5);
                if let Err(err) = speed.shutdown() {
                    defmt::error!("SYSTEM: could not park output: {}", err);
                }
            }
            LoopState::Stopped => {
                speed.resume();
                unsafe {
                    NVIC::unmask(pac::Interrupt::EXTI9_5);
                    NVIC::unmask(pac::Interrupt::TIM3);
                }
            }
        });
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
