use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Identifies one countdown so its events can be told apart from a
/// cancelled predecessor's.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification from a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One tick elapsed; `remaining` counts down to 0 inclusive.
    Tick { timer: TimerId, remaining: u32 },
    /// Sent once, right after the `remaining: 0` tick.
    Expired { timer: TimerId },
}

impl TimerEvent {
    #[must_use]
    pub fn timer(&self) -> TimerId {
        match self {
            TimerEvent::Tick { timer, .. } | TimerEvent::Expired { timer } => *timer,
        }
    }
}

pub type TimerEventSender = mpsc::UnboundedSender<TimerEvent>;
pub type TimerEventReceiver = mpsc::UnboundedReceiver<TimerEvent>;

/// A single rest countdown.
///
/// Each countdown is its own value: to restart, cancel (or drop) this one and
/// start another. Dropping cancels.
pub struct RestTimer {
    id: TimerId,
    ticks: u32,
    task: Option<JoinHandle<()>>,
}

impl RestTimer {
    /// Start counting `ticks` periods of length `period`.
    ///
    /// A zero-length countdown emits `Tick { remaining: 0 }` and `Expired`
    /// before returning and spawns nothing. Otherwise a task is spawned, so this
    /// must run inside a tokio runtime.
    #[must_use]
    pub fn start(id: TimerId, ticks: u32, period: Duration, events: TimerEventSender) -> Self {
        if ticks == 0 {
            let _ = events.send(TimerEvent::Tick {
                timer: id,
                remaining: 0,
            });
            let _ = events.send(TimerEvent::Expired { timer: id });
            return Self {
                id,
                ticks,
                task: None,
            };
        }

        tracing::trace!(timer = %id, ticks, ?period, "rest timer started");
        let task = tokio::spawn(count_down(id, ticks, period, events));
        Self {
            id,
            ticks,
            task: Some(task),
        }
    }

    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Length of this countdown in ticks.
    #[must_use]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the countdown. Safe to call any number of times.
    ///
    /// Events already sitting in the channel are not recalled; consumers
    /// filter them by `TimerId`.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::trace!(timer = %self.id, "rest timer cancelled");
        }
    }
}

impl Drop for RestTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for RestTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestTimer")
            .field("id", &self.id)
            .field("ticks", &self.ticks)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn count_down(id: TimerId, ticks: u32, period: Duration, events: TimerEventSender) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    let mut remaining = ticks;

    while remaining > 0 {
        interval.tick().await;
        remaining -= 1;
        if events
            .send(TimerEvent::Tick {
                timer: id,
                remaining,
            })
            .is_err()
        {
            return;
        }
    }

    let _ = events.send(TimerEvent::Expired { timer: id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn counts_down_to_zero_then_expires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();
        let _timer = RestTimer::start(TimerId::new(1), 3, SECOND, tx);

        let mut seen = Vec::new();
        while let Some(event) = rx.recv().await {
            seen.push(event);
            if matches!(event, TimerEvent::Expired { .. }) {
                break;
            }
        }

        let id = TimerId::new(1);
        assert_eq!(
            seen,
            vec![
                TimerEvent::Tick { timer: id, remaining: 2 },
                TimerEvent::Tick { timer: id, remaining: 1 },
                TimerEvent::Tick { timer: id, remaining: 0 },
                TimerEvent::Expired { timer: id },
            ]
        );
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_length_expires_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = RestTimer::start(TimerId::new(9), 0, SECOND, tx);
        assert!(!timer.is_running());

        let id = TimerId::new(9);
        assert_eq!(
            rx.try_recv(),
            Ok(TimerEvent::Tick { timer: id, remaining: 0 })
        );
        assert_eq!(rx.try_recv(), Ok(TimerEvent::Expired { timer: id }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _keep_open = tx.clone();
        let mut timer = RestTimer::start(TimerId::new(2), 5, SECOND, tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(
            first,
            TimerEvent::Tick { timer: TimerId::new(2), remaining: 4 }
        );

        timer.cancel();
        timer.cancel();
        assert!(!timer.is_running());

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _keep_open = tx.clone();
        drop(RestTimer::start(TimerId::new(3), 2, SECOND, tx));

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn timer_ids_are_ordered_and_step() {
        let id = TimerId::new(4);
        assert_eq!(id.next(), TimerId::new(5));
        assert!(id < id.next());
        assert_eq!(format!("{id:?}"), "TimerId(4)");
    }
}
