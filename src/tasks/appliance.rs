//! Appliance loop
//!
//! One iteration polls the touchscreen, applies any due countdown ticks and
//! then services the remote channel if it is due, always in that order. A
//! touch ends the iteration early.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{
    scheduler::{Scheduler, SERVICE_PERIOD, TICK_PERIOD},
    supervisor::{ReconnectSupervisor, ServiceReport},
};
use crate::{
    channel::{ChannelError, ConfigListener, MessageChannel, PayloadError},
    hardware::{DisplayError, Palette, Renderer, StatusLight, TouchError, TouchPoint, TouchSource},
    state::{AppState, Countdown, Effect, Indicator},
};

/// Text of the separator label
const COLON: &str = ":";

/// Failures that stop the appliance
#[derive(Debug, Error)]
pub enum ApplianceError {
    #[error("display failure: {0}")]
    Display(#[from] DisplayError),
    #[error("touch failure: {0}")]
    Touch(#[from] TouchError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("remote channel unavailable: {0}")]
    Channel(#[from] ChannelError),
}

/// Devices the appliance drives
pub struct Hardware<R, L, T> {
    pub renderer: R,
    pub light: L,
    pub touch: T,
}

/// Appliance tuning
#[derive(Debug, Clone)]
pub struct ApplianceSettings {
    /// Duration the first countdown starts from
    pub configured_minutes: u32,
    pub palette: Palette,
    pub tick_period: Duration,
    pub service_period: Duration,
    /// Delay between loop iterations
    pub poll_interval: Duration,
}

impl Default for ApplianceSettings {
    fn default() -> Self {
        Self {
            configured_minutes: 5,
            palette: Palette::default(),
            tick_period: TICK_PERIOD,
            service_period: SERVICE_PERIOD,
            poll_interval: Duration::from_millis(20),
        }
    }
}

/// What one iteration did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub touched: bool,
    pub ticks: u32,
    pub serviced: bool,
}

pub struct Appliance<R, L, T, C> {
    hardware: Hardware<R, L, T>,
    supervisor: ReconnectSupervisor<C>,
    listener: ConfigListener,
    countdown: Countdown,
    scheduler: Scheduler,
    palette: Palette,
    poll_interval: Duration,
    ticks: u64,
    state: Arc<AppState>,
}

impl<R, L, T, C> Appliance<R, L, T, C>
where
    R: Renderer,
    L: StatusLight,
    T: TouchSource,
    C: MessageChannel,
{
    pub fn new(
        hardware: Hardware<R, L, T>,
        channel: C,
        settings: ApplianceSettings,
        state: Arc<AppState>,
        start: Instant,
    ) -> Self {
        let listener = ConfigListener::new(channel.topic(), settings.configured_minutes);
        Self {
            hardware,
            supervisor: ReconnectSupervisor::new(channel),
            listener,
            countdown: Countdown::new(settings.configured_minutes),
            scheduler: Scheduler::new(start, settings.tick_period, settings.service_period),
            palette: settings.palette,
            poll_interval: settings.poll_interval,
            ticks: 0,
            state,
        }
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn configured_minutes(&self) -> u32 {
        self.listener.configured_minutes()
    }

    /// Connect the remote channel and show the idle light.
    ///
    /// A channel that cannot be reached here is fatal. The countdown is armed
    /// once connected, so time spent connecting is not counted down.
    pub async fn start(&mut self) -> Result<(), ApplianceError> {
        self.supervisor.connect().await?;
        self.scheduler.restart(Instant::now());
        self.apply(&[Effect::Indicator(Indicator::Idle)])?;
        self.publish();
        info!(
            "Countdown armed at {} on topic {}",
            self.countdown.remaining(),
            self.listener.topic()
        );
        Ok(())
    }

    /// Run one loop iteration as of `now`
    pub async fn step(&mut self, now: Instant) -> Result<StepOutcome, ApplianceError> {
        let mut outcome = StepOutcome::default();

        if let Some(point) = self.hardware.touch.poll()? {
            self.reset(point, now)?;
            outcome.touched = true;
            return Ok(outcome);
        }

        outcome.ticks = self.scheduler.ticks_due(now);
        if outcome.ticks > 1 {
            debug!("Catching up {} ticks", outcome.ticks);
        }
        for _ in 0..outcome.ticks {
            self.tick()?;
        }

        if self.scheduler.service_due(now) {
            self.service().await?;
            outcome.serviced = true;
        }

        if outcome.ticks > 0 || outcome.serviced {
            self.publish();
        }
        Ok(outcome)
    }

    /// Loop until a fatal error
    pub async fn run(mut self) -> Result<(), ApplianceError> {
        info!("Starting appliance loop");
        let mut poll = interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            poll.tick().await;
            self.step(Instant::now()).await?;
        }
    }

    fn reset(&mut self, point: TouchPoint, now: Instant) -> Result<(), ApplianceError> {
        let minutes = self.listener.configured_minutes();
        info!("Touch at ({}, {}), restarting countdown from {} minutes", point.x, point.y, minutes);

        let (countdown, effects) = self.countdown.reset(minutes);
        self.countdown = countdown;
        self.apply(&effects)?;
        self.scheduler.rearm_tick(now);

        self.state.record_action("reset");
        self.publish();
        Ok(())
    }

    fn tick(&mut self) -> Result<(), ApplianceError> {
        if !self.countdown.is_running() {
            return Ok(());
        }

        let (countdown, effects) = self.countdown.tick();
        self.countdown = countdown;
        self.ticks += 1;
        self.apply(&effects)?;

        if !countdown.is_running() {
            info!("Countdown expired after {} ticks", self.ticks);
            self.state.record_action("expired");
        }
        Ok(())
    }

    async fn service(&mut self) -> Result<(), ApplianceError> {
        match self.supervisor.service().await {
            ServiceReport::Delivered(messages) => {
                for message in &messages {
                    if let Some(minutes) = self.listener.apply(message)? {
                        info!("Next reset starts from {} minutes", minutes);
                        self.state.record_action("duration");
                    }
                }
            }
            ServiceReport::Failed { error, .. } => {
                if let Err(e) = self.state.add_error(format!("Remote channel failure: {}", error)) {
                    warn!("Failed to record channel failure: {}", e);
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, effects: &[Effect]) -> Result<(), DisplayError> {
        for effect in effects {
            match *effect {
                Effect::Background(background) => {
                    self.hardware.renderer.fill_background(background)?;
                }
                Effect::Labels(remaining) => {
                    self.hardware.renderer.set_labels(
                        &remaining.minutes_label(),
                        &remaining.seconds_label(),
                        COLON,
                    )?;
                }
                Effect::Indicator(indicator) => {
                    self.hardware.light.fill(self.palette.color(indicator));
                }
            }
        }
        Ok(())
    }

    /// Mirror loop-owned values into the shared snapshot
    fn publish(&self) {
        let countdown = self.countdown;
        let configured_minutes = self.listener.configured_minutes();
        let ticks = self.ticks;
        let channel = self.supervisor.stats().clone();

        let result = self.state.update_device(|device| {
            device.set_countdown(&countdown);
            device.configured_minutes = configured_minutes;
            device.ticks = ticks;
            device.channel = channel;
        });
        if let Err(e) = result {
            warn!("Failed to publish device state: {}", e);
        }
    }
}
