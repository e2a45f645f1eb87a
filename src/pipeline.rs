//! Generator → tracker pipeline.
//!
//! The producer task owns the `SignalGenerator` and ticks at the sample
//! rate; the consumer task owns the `MotionTracker`. Samples cross a bounded
//! channel, so tracker state is only ever touched by one task. Readers get a
//! copied `SharedView` from behind a short-held mutex.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::config::{validate_speed, PipelineConfig};
use crate::error::{MotionTrackerError, TrackResult};
use crate::simulator::SignalGenerator;
use crate::tracker::MotionTracker;
use crate::types::{SimulationMode, StateSnapshot, TrajectoryPoint};

/// What flows from producer to consumer.
#[derive(Debug, Clone, Copy)]
enum PipelineMessage {
    Sample(crate::types::SensorSample),
    /// Ordered with the samples so no stale sample lands after a reset.
    Reset,
}

#[derive(Debug, Clone, Copy)]
enum PipelineCommand {
    SetMode { mode: SimulationMode, speed: f64 },
    Reset,
}

/// Copy of the latest tracker output for display and status writers.
#[derive(Debug, Clone, Default)]
pub struct SharedView {
    pub state: StateSnapshot,
    /// Newest trajectory points, oldest first
    pub recent: Vec<TrajectoryPoint>,
    pub samples_processed: u64,
    pub mode: SimulationMode,
    pub speed: f64,
}

fn lock_view(view: &Mutex<SharedView>) -> MutexGuard<'_, SharedView> {
    // a panicked writer leaves a stale but consistent copy behind
    view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run `ticks` generate → process steps back to back, no sleeping.
///
/// Returns the last point produced, if any.
pub fn run_ticks(
    generator: &mut SignalGenerator,
    tracker: &mut MotionTracker,
    ticks: usize,
) -> Option<TrajectoryPoint> {
    let mut last = None;
    for _ in 0..ticks {
        let sample = generator.generate_sample();
        last = Some(tracker.process_sample(&sample));
    }
    last
}

pub struct PipelineHandle {
    stop: Arc<AtomicBool>,
    commands: mpsc::UnboundedSender<PipelineCommand>,
    view: Arc<Mutex<SharedView>>,
    producer: JoinHandle<SignalGenerator>,
    consumer: JoinHandle<MotionTracker>,
}

impl PipelineHandle {
    /// Start both tasks on the current tokio runtime.
    pub fn spawn(
        generator: SignalGenerator,
        tracker: MotionTracker,
        config: &PipelineConfig,
    ) -> TrackResult<Self> {
        config.validate()?;

        let stop = Arc::new(AtomicBool::new(false));
        let (sample_tx, sample_rx) = mpsc::channel(config.channel_capacity);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let view = Arc::new(Mutex::new(SharedView {
            state: tracker.current_state(),
            mode: generator.mode(),
            speed: generator.speed(),
            ..SharedView::default()
        }));

        info!(
            "Pipeline starting: {} at {:.2}x, {} Hz",
            generator.mode(),
            generator.speed(),
            generator.sample_rate()
        );

        let producer = tokio::spawn(produce(
            generator,
            sample_tx,
            command_rx,
            Arc::clone(&stop),
            Arc::clone(&view),
        ));
        let consumer = tokio::spawn(consume(
            tracker,
            sample_rx,
            Arc::clone(&view),
            config.view_points,
        ));

        Ok(PipelineHandle {
            stop,
            commands: command_tx,
            view,
            producer,
            consumer,
        })
    }

    pub fn set_mode(&self, mode: SimulationMode, speed: f64) -> TrackResult<()> {
        validate_speed(speed)?;
        self.send(PipelineCommand::SetMode { mode, speed })
    }

    /// Reset generator and tracker together.
    pub fn reset(&self) -> TrackResult<()> {
        self.send(PipelineCommand::Reset)
    }

    fn send(&self, command: PipelineCommand) -> TrackResult<()> {
        self.commands
            .send(command)
            .map_err(|_| MotionTrackerError::Pipeline("producer has stopped".to_string()))
    }

    pub fn view(&self) -> SharedView {
        lock_view(&self.view).clone()
    }

    pub fn is_running(&self) -> bool {
        !self.producer.is_finished()
    }

    /// Finish the in-flight tick, drain the channel and hand back both ends.
    pub async fn stop(self) -> TrackResult<(SignalGenerator, MotionTracker)> {
        self.stop.store(true, Ordering::Release);
        let generator = self
            .producer
            .await
            .map_err(|e| MotionTrackerError::Pipeline(format!("producer task failed: {}", e)))?;
        let tracker = self
            .consumer
            .await
            .map_err(|e| MotionTrackerError::Pipeline(format!("consumer task failed: {}", e)))?;
        info!(
            "Pipeline stopped after {} samples",
            generator.samples_generated()
        );
        Ok((generator, tracker))
    }
}

async fn produce(
    mut generator: SignalGenerator,
    samples: mpsc::Sender<PipelineMessage>,
    mut commands: mpsc::UnboundedReceiver<PipelineCommand>,
    stop: Arc<AtomicBool>,
    view: Arc<Mutex<SharedView>>,
) -> SignalGenerator {
    let period = Duration::from_secs_f64(generator.dt()).max(Duration::from_nanos(1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    'ticks: loop {
        ticker.tick().await;
        if stop.load(Ordering::Acquire) {
            break;
        }

        while let Ok(command) = commands.try_recv() {
            match command {
                PipelineCommand::SetMode { mode, speed } => {
                    match generator.set_mode(mode, speed) {
                        Ok(()) => {
                            let mut shared = lock_view(&view);
                            shared.mode = mode;
                            shared.speed = speed;
                        }
                        Err(e) => warn!("Ignoring mode change: {}", e),
                    }
                }
                PipelineCommand::Reset => {
                    generator.reset();
                    if samples.send(PipelineMessage::Reset).await.is_err() {
                        warn!("Consumer gone, producer exiting");
                        break 'ticks;
                    }
                }
            }
        }

        let sample = generator.generate_sample();
        if samples.send(PipelineMessage::Sample(sample)).await.is_err() {
            warn!("Consumer gone, producer exiting");
            break;
        }
    }

    debug!("Producer finished");
    generator
}

async fn consume(
    mut tracker: MotionTracker,
    mut samples: mpsc::Receiver<PipelineMessage>,
    view: Arc<Mutex<SharedView>>,
    view_points: usize,
) -> MotionTracker {
    while let Some(message) = samples.recv().await {
        match message {
            PipelineMessage::Sample(sample) => {
                tracker.process_sample(&sample);
            }
            PipelineMessage::Reset => tracker.reset(),
        }

        let mut shared = lock_view(&view);
        shared.state = tracker.current_state();
        shared.recent = tracker.get_trajectory(Some(view_points));
        shared.samples_processed = tracker.samples_processed();
    }

    debug!("Consumer drained");
    tracker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfig, NoiseConfig, TimeSource, TrackerConfig};
    use tokio::time::sleep;

    fn components(sample_rate: f64) -> (SignalGenerator, MotionTracker) {
        let generator = SignalGenerator::new(GeneratorConfig {
            sample_rate,
            time_source: TimeSource::Simulated { start: 0.0 },
            noise: NoiseConfig::noiseless(),
            ..GeneratorConfig::default()
        })
        .unwrap();
        let tracker = MotionTracker::new(TrackerConfig::default()).unwrap();
        (generator, tracker)
    }

    #[test]
    fn test_run_ticks() {
        let (mut generator, mut tracker) = components(50.0);
        assert!(run_ticks(&mut generator, &mut tracker, 0).is_none());

        let last = run_ticks(&mut generator, &mut tracker, 30).unwrap();
        assert_eq!(generator.samples_generated(), 30);
        assert_eq!(tracker.samples_processed(), 30);
        assert_eq!(tracker.get_trajectory(Some(1))[0], last);
    }

    #[tokio::test]
    async fn test_stop_returns_owned_components() {
        let (generator, tracker) = components(500.0);
        let handle = PipelineHandle::spawn(generator, tracker, &PipelineConfig::default()).unwrap();
        sleep(Duration::from_millis(60)).await;
        assert!(handle.is_running());

        let (generator, tracker) = handle.stop().await.unwrap();
        assert!(generator.samples_generated() > 0);
        // every generated sample was drained into the tracker
        assert_eq!(tracker.samples_processed(), generator.samples_generated());
    }

    #[tokio::test]
    async fn test_view_tracks_consumer() {
        let (generator, tracker) = components(500.0);
        let config = PipelineConfig {
            view_points: 8,
            ..PipelineConfig::default()
        };
        let handle = PipelineHandle::spawn(generator, tracker, &config).unwrap();
        sleep(Duration::from_millis(80)).await;

        let view = handle.view();
        assert!(view.recent.len() <= 8);
        assert_eq!(view.mode, SimulationMode::Demo);

        let (_, tracker) = handle.stop().await.unwrap();
        let final_view_len = tracker.get_trajectory(Some(8)).len();
        assert!(final_view_len >= view.recent.len());
    }

    #[tokio::test]
    async fn test_set_mode_reaches_generator() {
        let (generator, tracker) = components(500.0);
        let handle = PipelineHandle::spawn(generator, tracker, &PipelineConfig::default()).unwrap();

        assert!(handle.set_mode(SimulationMode::Random, -2.0).is_err());
        handle.set_mode(SimulationMode::Random, 3.0).unwrap();
        sleep(Duration::from_millis(40)).await;

        let view = handle.view();
        assert_eq!(view.mode, SimulationMode::Random);
        assert_eq!(view.speed, 3.0);

        let (generator, _) = handle.stop().await.unwrap();
        assert_eq!(generator.mode(), SimulationMode::Random);
        assert_eq!(generator.speed(), 3.0);
    }

    #[tokio::test]
    async fn test_reset_is_ordered_with_samples() {
        let (generator, tracker) = components(500.0);
        let handle = PipelineHandle::spawn(generator, tracker, &PipelineConfig::default()).unwrap();
        sleep(Duration::from_millis(40)).await;
        handle.reset().unwrap();
        sleep(Duration::from_millis(20)).await;

        let (generator, tracker) = handle.stop().await.unwrap();
        assert!(tracker.samples_processed() < generator.samples_generated());
        // trajectory holds only post-reset points, in time order
        let points = tracker.get_trajectory(None);
        assert_eq!(points.len() as u64, tracker.samples_processed());
        assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[tokio::test]
    async fn test_commands_fail_after_stop() {
        let (generator, tracker) = components(200.0);
        let handle = PipelineHandle::spawn(generator, tracker, &PipelineConfig::default()).unwrap();
        let stop_flag = Arc::clone(&handle.stop);
        let commands = handle.commands.clone();
        handle.stop().await.unwrap();
        assert!(stop_flag.load(Ordering::Acquire));
        assert!(commands.send(PipelineCommand::Reset).is_err());
    }

    #[test]
    fn test_spawn_rejects_invalid_config() {
        let (generator, tracker) = components(50.0);
        let config = PipelineConfig {
            channel_capacity: 0,
            ..PipelineConfig::default()
        };
        // validation fails before anything is spawned, so no runtime is needed
        assert!(PipelineHandle::spawn(generator, tracker, &config).is_err());
    }
}
