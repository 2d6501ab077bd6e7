use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::SourceAdapter;
use crate::types::{DetectionEvent, Observation, Pose, SourceKind, SourcePayload, Track};

/// Maximum centroid distance (in pixels) for a detection to reuse an
/// existing tracking id.
pub const CENTROID_MATCH_RADIUS: f64 = 100.0;

/// Non-human classes that still get a schematic skeleton synthesized
/// from their bounding box.
const ANIMAL_CLASSES: [&str; 3] = ["cat", "dog", "bird"];

/// Vision adapter settings.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Tracked objects unseen for longer than this are evicted before
    /// the next match pass.
    pub tracking_timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            tracking_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
struct TrackedObject {
    centroid: (f64, f64),
    last_seen: Instant,
}

/// Nearest-centroid tracker. Ids are allocated monotonically; a new
/// detection matches the closest tracked object within
/// [`CENTROID_MATCH_RADIUS`], ties resolved by insertion order.
#[derive(Debug)]
pub struct CentroidTracker {
    next_id: u32,
    // BTreeMap keeps iteration in id (= insertion) order, which is what
    // makes the first-match tie-break deterministic.
    objects: BTreeMap<u32, TrackedObject>,
    match_radius: f64,
    stale_after: Duration,
}

impl CentroidTracker {
    pub fn new(match_radius: f64, stale_after: Duration) -> Self {
        Self {
            next_id: 0,
            objects: BTreeMap::new(),
            match_radius,
            stale_after,
        }
    }

    /// Assign a tracking id for a bounding box observed now.
    pub fn assign(&mut self, bbox: &[i32; 4]) -> u32 {
        self.assign_at(Instant::now(), bbox)
    }

    /// Deterministic entry point: `now` drives both staleness eviction
    /// and the last-seen stamp.
    pub fn assign_at(&mut self, now: Instant, bbox: &[i32; 4]) -> u32 {
        self.objects
            .retain(|_, obj| now.duration_since(obj.last_seen) <= self.stale_after);

        let centroid = (
            (bbox[0] + bbox[2]) as f64 / 2.0,
            (bbox[1] + bbox[3]) as f64 / 2.0,
        );

        let mut min_dist = f64::INFINITY;
        let mut closest: Option<u32> = None;
        for (&id, obj) in &self.objects {
            let dx = obj.centroid.0 - centroid.0;
            let dy = obj.centroid.1 - centroid.1;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < min_dist && dist < self.match_radius {
                min_dist = dist;
                closest = Some(id);
            }
        }

        if let Some(id) = closest {
            if let Some(obj) = self.objects.get_mut(&id) {
                obj.centroid = centroid;
                obj.last_seen = now;
                return id;
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(
            id,
            TrackedObject {
                centroid,
                last_seen: now,
            },
        );
        id
    }

    pub fn tracked_count(&self) -> usize {
        self.objects.len()
    }
}

/// Turns one frame's detector observations into a detection event:
/// assigns tracking ids, synthesizes schematic skeletons for animal
/// classes, and averages per-detection confidences.
pub struct VisionAdapter {
    tracker: CentroidTracker,
}

impl VisionAdapter {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            tracker: CentroidTracker::new(CENTROID_MATCH_RADIUS, config.tracking_timeout),
        }
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }
}

impl SourceAdapter for VisionAdapter {
    type Input = Vec<Observation>;

    fn process(&mut self, observations: Vec<Observation>) -> DetectionEvent {
        let mut tracks = Vec::with_capacity(observations.len());
        let mut confidence_sum = 0.0;
        let count = observations.len();

        for obs in observations {
            let tracking_id = self.tracker.assign(&obs.bbox);
            confidence_sum += obs.confidence;

            let pose = match obs.keypoints {
                Some(keypoints) => Some(Pose {
                    keypoints,
                    is_animal: false,
                }),
                None if ANIMAL_CLASSES.contains(&obs.class_name.as_str()) => {
                    Some(schematic_skeleton(&obs.bbox))
                }
                None => None,
            };

            tracks.push(Track {
                bbox: obs.bbox,
                class_id: obs.class_id,
                class_name: obs.class_name,
                tracking_id,
                pose,
            });
        }

        let motion = !tracks.is_empty();
        let confidence = if count > 0 {
            confidence_sum / count as f64
        } else {
            0.0
        };

        DetectionEvent::now(
            SourceKind::Camera,
            motion,
            confidence,
            SourcePayload::Vision { tracks },
        )
    }
}

/// Fixed 5-point schematic skeleton for non-human classes: box center
/// plus four corners inset by 10% of the box size, all at full score.
fn schematic_skeleton(bbox: &[i32; 4]) -> Pose {
    let [x1, y1, x2, y2] = bbox.map(f64::from);
    let w = x2 - x1;
    let h = y2 - y1;
    Pose {
        keypoints: vec![
            [x1 + w / 2.0, y1 + h / 2.0, 1.0],
            [x1 + 0.1 * w, y1 + 0.1 * h, 1.0],
            [x2 - 0.1 * w, y1 + 0.1 * h, 1.0],
            [x1 + 0.1 * w, y2 - 0.1 * h, 1.0],
            [x2 - 0.1 * w, y2 - 0.1 * h, 1.0],
        ],
        is_animal: true,
    }
}
