use std::future::poll_fn;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::time::DelayQueue;
use tracing::debug;
use uuid::Uuid;

use crate::ambient::field::BubbleField;
use crate::models::{Bubble, BubbleBounds};

#[derive(Debug, Clone)]
pub struct AmbientSettings {
    /// Time between spawns. The first bubble appears one interval after start.
    pub interval: Duration,
    /// How long each bubble stays on screen.
    pub lifetime: Duration,
    pub bounds: BubbleBounds,
    /// Fixed RNG seed for reproducible layouts; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            lifetime: Duration::from_secs(8),
            bounds: BubbleBounds::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientEvent {
    Spawned(Uuid),
    Expired(Uuid),
}

/// Owns the spawn timer and the pending expiries for the bubbles on screen.
///
/// Starting the driver acquires the timer; dropping it releases the timer and
/// every pending expiry together, so nothing spawns or expires afterwards.
/// The owning view drops it on every exit path.
pub struct AmbientDriver {
    ticker: Interval,
    expiries: DelayQueue<Uuid>,
    field: BubbleField,
    rng: StdRng,
    settings: AmbientSettings,
}

impl AmbientDriver {
    pub fn start(settings: AmbientSettings) -> Self {
        let mut ticker = interval_at(Instant::now() + settings.interval, settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!(
            interval_ms = settings.interval.as_millis() as u64,
            lifetime_ms = settings.lifetime.as_millis() as u64,
            "Ambient timer acquired"
        );

        Self {
            ticker,
            expiries: DelayQueue::new(),
            field: BubbleField::new(),
            rng,
            settings,
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        self.field.as_slice()
    }

    /// Waits for the next spawn or expiry and applies it to the field.
    ///
    /// Cancel-safe: dropping the returned future before it resolves loses nothing.
    /// An expiry due at the same instant as a spawn is applied first.
    pub async fn next_event(&mut self) -> AmbientEvent {
        tokio::select! {
            biased;
            Some(expired) = poll_fn(|cx| self.expiries.poll_expired(cx)), if !self.expiries.is_empty() => {
                let id = expired.into_inner();
                self.field.remove(id);
                AmbientEvent::Expired(id)
            }
            _ = self.ticker.tick() => {
                let bubble = Bubble::random(&mut self.rng, &self.settings.bounds);
                let id = bubble.id;
                self.expiries.insert(id, self.settings.lifetime);
                self.field.insert(bubble);
                AmbientEvent::Spawned(id)
            }
        }
    }
}

impl Drop for AmbientDriver {
    fn drop(&mut self) {
        debug!(discarded = self.field.len(), "Ambient timer released");
    }
}
