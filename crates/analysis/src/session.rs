use crate::{
    config::TrackingConfig,
    corners::CornerLookup,
    lap_clock::{Crossing, LapClock, LapState},
    track::TrackModel,
    tracker::{Located, PositionTracker},
};
use model::{CompletedLap, OnTrack, Sample, TrackRecord};
use uuid::Uuid;

/// One vehicle's pass over one sample stream: locate, time, label.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    tracker: PositionTracker<'a>,
    clock: LapClock,
    corners: &'a CornerLookup,
    laps: Vec<CompletedLap>,
    off_track: usize,
}

impl<'a> Session<'a> {
    pub fn new(track: &'a TrackModel, corners: &'a CornerLookup, config: TrackingConfig) -> Self {
        let clock = LapClock::new(config.laps.clone());
        Self {
            tracker: PositionTracker::new(track, config),
            clock,
            corners,
            laps: Vec::new(),
            off_track: 0,
        }
    }

    pub fn process(&mut self, sample: Sample) -> TrackRecord {
        let position = match self.tracker.locate(sample.position) {
            Located::Found { position, .. } => position,
            Located::NotFound => {
                self.off_track += 1;
                return TrackRecord { position: sample.position, t_s: sample.t_s, on_track: None };
            }
        };

        let step = self.clock.process(&position, sample.t_s);
        if let Some(Crossing::Completed { number, start_s, time_s }) = step.crossing {
            self.laps.push(CompletedLap { id: Uuid::new_v4(), number, start_s, time_s });
        }

        TrackRecord {
            position: sample.position,
            t_s: sample.t_s,
            on_track: Some(OnTrack {
                distance_from_start_m: position.distance_from_start_m,
                cross_track_m: position.cross_track_m,
                lap_number: step.snapshot.lap_number,
                lap_elapsed_s: step.snapshot.lap_elapsed_s,
                last_lap_time_s: step.snapshot.last_lap_time_s,
                corner: self.corners.label_for(position.distance_from_start_m).to_string(),
            }),
        }
    }

    pub fn completed_laps(&self) -> &[CompletedLap] {
        &self.laps
    }

    pub fn off_track_samples(&self) -> usize {
        self.off_track
    }

    pub fn lap_state(&self) -> &LapState {
        self.clock.state()
    }
}
