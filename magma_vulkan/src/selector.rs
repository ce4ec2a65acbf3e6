use crate::capability::{CapabilitySnapshot, DeviceQuery};
use crate::compatibility::{CompatibilityChecker, RequirementFailure};
use crate::physical_device::PhysicalDeviceType;
use std::fmt::{Debug, Formatter};

pub type ScoreFunction = Box<dyn Fn(&CapabilitySnapshot) -> u64>;

/// A candidate turned down by the requirement set, with every reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub index: usize,
    pub device_name: String,
    pub failures: Vec<RequirementFailure>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No suitable device found, {} candidate(s) rejected", .rejections.len())]
    NoCompatibleDevice { rejections: Vec<Rejection> },

    #[error("Device {device_name} has no queue family supporting both graphics and present")]
    NoQualifyingQueueFamily { index: usize, device_name: String },
}

pub struct Selection<'a, D> {
    pub device: &'a D,
    /// Position of the device in the candidate list.
    pub index: usize,
    pub queue_family_index: u32,
    pub snapshot: CapabilitySnapshot,
    pub score: Option<u64>,
}

impl<D> Debug for Selection<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("device", &self.snapshot.properties.name)
            .field("index", &self.index)
            .field("queue_family_index", &self.queue_family_index)
            .field("score", &self.score)
            .finish()
    }
}

/// Picks the device to render with.
///
/// Without a score function the first compatible candidate wins. With one, the highest
/// score wins and ties go to the candidate enumerated first.
pub struct DeviceSelector {
    checker: CompatibilityChecker,
    score_function: Option<ScoreFunction>,
}

impl DeviceSelector {
    pub fn new(checker: CompatibilityChecker) -> Self {
        Self {
            checker,
            score_function: None,
        }
    }

    pub fn with_score_function(
        mut self,
        score_function: impl Fn(&CapabilitySnapshot) -> u64 + 'static,
    ) -> Self {
        self.score_function = Some(Box::new(score_function));
        self
    }

    pub fn checker(&self) -> &CompatibilityChecker {
        &self.checker
    }

    pub fn select<'a, D: DeviceQuery>(
        &self,
        candidates: &'a [D],
        surface: &D::Surface,
    ) -> Result<Selection<'a, D>, SelectionError> {
        let mut compatible: Vec<(usize, CapabilitySnapshot)> = Vec::new();
        let mut rejections = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let snapshot = CapabilitySnapshot::capture(candidate, surface);
            let report = self.checker.check(&snapshot);
            if report.is_compatible() {
                debug!("Device {} is compatible", snapshot.properties.name);
                compatible.push((index, snapshot));
            } else {
                for failure in report.failures.iter() {
                    debug!(
                        "Device {} rejected ({}): {}",
                        snapshot.properties.name, failure.requirement, failure.reason
                    );
                }
                rejections.push(Rejection {
                    index,
                    device_name: snapshot.properties.name,
                    failures: report.failures,
                });
            }
        }

        let (index, snapshot, score) = match &self.score_function {
            Some(score_function) => compatible
                .into_iter()
                .map(|(index, snapshot)| {
                    let score = score_function(&snapshot);
                    (index, snapshot, Some(score))
                })
                .fold(None, |best: Option<(usize, CapabilitySnapshot, Option<u64>)>, next| {
                    match best {
                        Some(best) if best.2 >= next.2 => Some(best),
                        _ => Some(next),
                    }
                }),
            None => compatible
                .into_iter()
                .next()
                .map(|(index, snapshot)| (index, snapshot, None)),
        }
        .ok_or(SelectionError::NoCompatibleDevice { rejections })?;

        let queue_family_index = snapshot.graphics_present_queue_family().ok_or_else(|| {
            SelectionError::NoQualifyingQueueFamily {
                index,
                device_name: snapshot.properties.name.clone(),
            }
        })?;

        info!(
            "Selected device {} (queue family {}, score {:?})",
            snapshot.properties.name, queue_family_index, score
        );

        Ok(Selection {
            device: &candidates[index],
            index,
            queue_family_index,
            snapshot,
            score,
        })
    }
}

/// Selects the first candidate meeting `requirements`.
pub fn select<'a, D: DeviceQuery>(
    candidates: &'a [D],
    requirements: CompatibilityChecker,
    surface: &D::Surface,
) -> Result<Selection<'a, D>, SelectionError> {
    DeviceSelector::new(requirements).select(candidates, surface)
}

/// Prefers discrete over integrated over virtual over CPU devices, then larger device-local
/// memory.
pub fn device_type_score(snapshot: &CapabilitySnapshot) -> u64 {
    let type_score: u64 = match snapshot.properties.device_type {
        PhysicalDeviceType::Discrete => 4,
        PhysicalDeviceType::Integrated => 3,
        PhysicalDeviceType::Virtual => 2,
        PhysicalDeviceType::Cpu => 1,
        PhysicalDeviceType::Other => 0,
    };
    // 48 bits of memory in MiB is far beyond any real heap
    let memory_mib = (snapshot.properties.device_local_bytes >> 20).min((1 << 48) - 1);
    (type_score << 48) | memory_mib
}
