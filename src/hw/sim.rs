//! Simulated hardware: scripted event source and asset loader
//!
//! A `Scenario` is a YAML file describing which cubes are present at startup
//! and which events fire at which frame. `ScenarioPlayer` replays it onto the
//! runtime's event channel; `SimLoader` stands in for the radio-flash asset
//! transfer, completing after a fixed number of polls.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::events::CubeEvent;
use crate::hw::AssetLoader;
use crate::sets::{CubeSet, Side, SlotId};

/// Scenario file problems.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("initial slot {slot} outside capacity {capacity}")]
    SlotOutOfRange { slot: usize, capacity: usize },
}

/// One scheduled event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    /// Frame number at which the event is delivered.
    pub frame: u64,
    #[serde(flatten)]
    pub event: CubeEvent,
}

/// A scripted run of the demo.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Scenario {
    /// Slots already connected when the demo starts.
    #[serde(default)]
    pub initial: Vec<usize>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load and validate a scenario file.
    pub async fn load(path: &str, capacity: usize) -> Result<Self, ScenarioError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let scenario: Scenario = serde_yaml::from_str(&contents)?;
        scenario.validate(capacity)?;
        Ok(scenario)
    }

    /// Initially-present slots must be real cube slots. Event slots are left
    /// alone: out-of-range ids there model anchor endpoints and are part of
    /// what the runtime has to tolerate.
    pub fn validate(&self, capacity: usize) -> Result<(), ScenarioError> {
        for &slot in &self.initial {
            if SlotId::new(slot, capacity).is_none() {
                return Err(ScenarioError::SlotOutOfRange { slot, capacity });
            }
        }
        Ok(())
    }

    /// Built-in scenario used when no file is configured: one cube present,
    /// a second one joins, they touch, part, and the newcomer drops off.
    pub fn demo() -> Self {
        let steps = vec![
            Step {
                frame: 2,
                event: CubeEvent::Connect { slot: 1 },
            },
            Step {
                frame: 4,
                event: CubeEvent::Touch {
                    slot: 0,
                    pressed: true,
                },
            },
            Step {
                frame: 5,
                event: CubeEvent::Touch {
                    slot: 0,
                    pressed: false,
                },
            },
            Step {
                frame: 8,
                event: CubeEvent::NeighborAdd {
                    a: 0,
                    side_a: Side::Right,
                    b: 1,
                    side_b: Side::Left,
                },
            },
            Step {
                frame: 12,
                event: CubeEvent::Accel {
                    slot: 1,
                    x: 12,
                    y: -3,
                    z: 64,
                },
            },
            Step {
                frame: 16,
                event: CubeEvent::NeighborRemove {
                    a: 0,
                    side_a: Side::Right,
                    b: 1,
                    side_b: Side::Left,
                },
            },
            Step {
                frame: 18,
                event: CubeEvent::Battery { slot: 0, level: 0.8 },
            },
            Step {
                frame: 22,
                event: CubeEvent::Disconnect { slot: 1 },
            },
        ];
        Self {
            initial: vec![0],
            steps,
        }
    }
}

/// Replays a scenario onto the event channel, paced by the frame interval.
pub struct ScenarioPlayer;

impl ScenarioPlayer {
    /// Spawn the replay task. The task ends (closing its sender clone) after
    /// the last step, which lets `--frames`-bounded runs drain and exit.
    pub fn spawn(
        scenario: Scenario,
        tx: mpsc::Sender<CubeEvent>,
        frame_interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = Instant::now();
            for step in scenario.steps {
                let due = start + frame_interval * step.frame as u32;
                tokio::time::sleep_until(due).await;
                debug!("scenario frame {}: {:?}", step.frame, step.event);
                if tx.send(step.event).await.is_err() {
                    // runtime went away first
                    break;
                }
            }
            info!("scenario playback finished");
        })
    }
}

struct SimLoaderState {
    pending: CubeSet,
    polls_left: u32,
}

/// Asset loader stand-in. Each completion poll advances the simulated
/// transfer by one step; after `polls_total` polls the load is complete.
pub struct SimLoader {
    polls_total: u32,
    state: Mutex<SimLoaderState>,
}

impl SimLoader {
    pub fn new(polls_total: u32) -> Self {
        Self {
            polls_total,
            state: Mutex::new(SimLoaderState {
                pending: CubeSet::new(),
                polls_left: 0,
            }),
        }
    }
}

#[async_trait]
impl AssetLoader for SimLoader {
    async fn start(&self, slots: CubeSet) -> Result<()> {
        let mut state = self.state.lock().await;
        state.pending = slots;
        state.polls_left = self.polls_total;
        info!("asset load started for {} cube(s)", slots.len());
        Ok(())
    }

    async fn is_complete(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.polls_left == 0 {
            return true;
        }
        state.polls_left -= 1;
        state.polls_left == 0
    }

    async fn progress(&self, slot: SlotId) -> f32 {
        let state = self.state.lock().await;
        // slots outside the transfer already have their assets
        if self.polls_total == 0 || !state.pending.test(slot) {
            return 1.0;
        }
        1.0 - state.polls_left as f32 / self.polls_total as f32
    }

    async fn finish(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.pending = CubeSet::new();
        info!("asset load finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_yaml_parsing() {
        let yaml = r#"
initial: [0, 1]
steps:
  - { frame: 3, type: connect, slot: 2 }
  - { frame: 5, type: neighbor_add, a: 0, side_a: right, b: 2, side_b: left }
  - { frame: 9, type: disconnect, slot: 2 }
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.initial, vec![0, 1]);
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.steps[0].event, CubeEvent::Connect { slot: 2 });
        assert!(scenario.validate(4).is_ok());
    }

    #[test]
    fn test_scenario_validation_rejects_bad_initial_slot() {
        let scenario = Scenario {
            initial: vec![0, 9],
            steps: vec![],
        };
        let err = scenario.validate(4).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::SlotOutOfRange { slot: 9, capacity: 4 }
        ));
    }

    #[tokio::test]
    async fn test_sim_loader_completes_after_polls() {
        let loader = SimLoader::new(2);
        let mut set = CubeSet::new();
        set.mark(SlotId::new(0, 4).unwrap());
        loader.start(set).await.unwrap();

        let slot = SlotId::new(0, 4).unwrap();
        assert!(!loader.is_complete().await);
        assert_eq!(loader.progress(slot).await, 0.5);
        assert!(loader.is_complete().await);
        assert_eq!(loader.progress(slot).await, 1.0);
        loader.finish().await.unwrap();

        // stays complete until the next start
        assert!(loader.is_complete().await);
    }
}
