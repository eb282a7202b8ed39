//! Single-channel PWM speed command on TIM2.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use hal::{
    clocks::Clocks,
    pac::TIM2,
    timer::{
        Alignment, CaptureCompareDma, CountDir, OutputCompare, TimChannel, Timer, TimerConfig,
        UpdateReqSrc,
    },
};

use super::pinout;

const CHANNEL: TimChannel = TimChannel::C1;

pub struct TimPWM {
    tim: Timer<TIM2>,
    period: u16, // Auto-reload value: compare value of 100% duty
}

impl TimPWM {
    /// Sets up TIM2 center-aligned at `freq` Hz with the output held at zero duty.
    pub fn new(tim2: TIM2, clock_cfg: &Clocks, freq: u16) -> Self {
        let mut timer = Timer::new_tim2(
            tim2,
            freq as f32,
            TimerConfig {
                one_pulse_mode: false,
                update_request_source: UpdateReqSrc::Any,
                auto_reload_preload: true,
                alignment: Alignment::Center1,
                capture_compare_dma: CaptureCompareDma::Update,
                direction: CountDir::Up,
            },
            clock_cfg,
        );
        timer.enable_pwm_output(CHANNEL, OutputCompare::Pwm1, 0.0);
        timer.set_duty(CHANNEL, 0);

        // Duty is carried as u16; a 32-bit reload is capped
        let period = u16::try_from(timer.get_max_duty()).unwrap_or(u16::MAX);
        defmt::debug!("PWM: {} Hz, period {}", freq, period);

        TimPWM { tim: timer, period }
    }

    /// Routes the channel to its pin and starts counting.
    pub fn begin(&mut self) {
        pinout::driver::PWM.init();
        self.tim.enable();
    }
}

impl ErrorType for TimPWM {
    type Error = Infallible;
}

impl SetDutyCycle for TimPWM {
    fn max_duty_cycle(&self) -> u16 {
        self.period
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.tim.set_duty(CHANNEL, duty.min(self.period) as u32);
        Ok(())
    }
}
