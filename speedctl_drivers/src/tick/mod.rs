//! Periodic control tick on TIM3.

use hal::{
    clocks::Clocks,
    pac::TIM3,
    timer::{Timer, TimerConfig, TimerInterrupt},
};

use speedctl_algo::config::tick_period_from_timer;

pub struct TickTimer {
    tim: Timer<TIM3>,
    period_s: f32,
}

impl TickTimer {
    /// Configures TIM3 to count at `counter_hz` and raise its update interrupt every
    /// `reload + 1` counts. The timer stays stopped until [`TickTimer::start`].
    pub fn new(tim3: TIM3, clock_cfg: &Clocks, counter_hz: u32, reload: u16) -> Self {
        let mut tim = Timer::new_tim3(tim3, 1.0, TimerConfig::default(), clock_cfg);

        let timer_clock = clock_cfg.apb1_timer();
        let psc = (timer_clock / counter_hz.max(1)).saturating_sub(1);
        let psc = u16::try_from(psc).unwrap_or(u16::MAX);
        tim.set_prescaler(psc);
        tim.set_auto_reload(reload as u32);
        tim.enable_interrupt(TimerInterrupt::Update);

        // Integer prescaler: use the counter clock actually obtained
        let counter_hz = timer_clock / (psc as u32 + 1);
        let period_s = tick_period_from_timer(counter_hz, reload as u32);
        defmt::debug!("TICK: {} Hz counter, reload {}, period {} s", counter_hz, reload, period_s);

        TickTimer { tim, period_s }
    }

    pub fn start(&mut self) {
        self.tim.enable();
    }

    /// Acknowledge the update interrupt. Call first thing in the handler.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.tim.clear_interrupt(TimerInterrupt::Update);
    }

    /// Seconds between two ticks.
    pub fn period_s(&self) -> f32 {
        self.period_s
    }
}
