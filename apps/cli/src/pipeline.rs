use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use analysis::{format_lap_time, lap_summary, CornerLookup, Session, TrackModel, TrackingConfig};
use iox::{AnnotatedWriter, LogReader};
use model::TrackRecord;

use crate::Args;

/// Load the track, stream the log through a session and write the results.
/// Returns the lap summary.
pub fn run(args: &Args, config: TrackingConfig) -> Result<Value> {
    let def = iox::load_track_dir(&args.track_dir)?;
    let track = TrackModel::build(&def.points)
        .with_context(|| format!("build track from {}", args.track_dir.display()))?;
    let corners = CornerLookup::new(def.corners).context("invalid corner table")?;

    let reader = LogReader::open(&args.log, def.converter)?;
    let mut writer = AnnotatedWriter::create(&args.out, reader.headers())?;
    let mut session = Session::new(&track, &corners, config);

    let mut last_t = f64::NEG_INFINITY;
    let mut rows = 0usize;
    for line in reader {
        let line = line?;
        rows += 1;
        let sample = line.sample;
        let rec = if sample.t_s < last_t {
            warn!(t_s = sample.t_s, last_t, "timestamp went backwards; row left unannotated");
            TrackRecord { position: sample.position, t_s: sample.t_s, on_track: None }
        } else {
            last_t = sample.t_s;
            session.process(sample)
        };
        writer.write(&line.record, &rec)?;
    }
    writer.finish()?;

    let laps = session.completed_laps();
    for l in laps {
        info!(lap = l.number, time = %format_lap_time(l.time_s), "lap");
    }
    info!(rows, off_track = session.off_track_samples(), out = %args.out.display(), "log processed");

    if let Some(path) = &args.laps {
        iox::export_laps_ndjson(laps, path)?;
    }
    Ok(lap_summary(laps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fmt::Write as _, fs, path::PathBuf};
    use uuid::Uuid;

    const REF_LAT: f64 = 36.58;
    const REF_LON: f64 = -121.75;
    const M_PER_DEG: f64 = 40_075_017.0 / 360.0;
    const RADIUS_M: f64 = 200.0;

    fn lat_lon(x: f64, y: f64) -> (f64, f64) {
        (REF_LAT + y / M_PER_DEG, REF_LON + x / (M_PER_DEG * REF_LAT.to_radians().cos()))
    }

    fn on_circle(deg: f64) -> (f64, f64) {
        let a = deg.to_radians();
        lat_lon(RADIUS_M * a.cos(), RADIUS_M * a.sin())
    }

    fn fixture() -> (PathBuf, Args) {
        let dir = std::env::temp_dir().join(format!("lapcalc-run-{}", Uuid::new_v4()));
        let track_dir = dir.join("track");
        fs::create_dir_all(&track_dir).unwrap();
        fs::write(track_dir.join("track.txt"), format!("{},{}", REF_LAT, REF_LON)).unwrap();

        // 72-gon around the reference, closed, counter-clockwise
        let mut points = String::new();
        for k in 0..=72 {
            let (lat, lon) = on_circle(5.0 * (k % 72) as f64);
            writeln!(points, "{:.10},{:.10}", lat, lon).unwrap();
        }
        fs::write(track_dir.join("points.csv"), points).unwrap();
        let half = std::f64::consts::PI * RADIUS_M;
        fs::write(
            track_dir.join("corners.json"),
            format!(r#"{{"corners":[{{"below_m":{},"label":"north"}}],"fallback":"south"}}"#, half),
        )
        .unwrap();

        // one revolution a minute, a fix every second, starting just past the line
        let mut log = String::from("Interval,Latitude,Longitude,Speed\n");
        for t in 0..=155u32 {
            let (lat, lon) = on_circle(1.0 + 6.0 * t as f64);
            writeln!(log, "{},{:.10},{:.10},75", t * 1000, lat, lon).unwrap();
            if t == 30 {
                writeln!(log, "{},,,75", t * 1000 + 250).unwrap();
                let (lat, lon) = lat_lon(5000.0, 5000.0);
                writeln!(log, "{},{:.10},{:.10},75", t * 1000 + 500, lat, lon).unwrap();
            }
        }
        let log_path = dir.join("log.csv");
        fs::write(&log_path, log).unwrap();

        let args = Args {
            track_dir,
            log: log_path,
            out: dir.join("out.csv"),
            config: None,
            laps: Some(dir.join("laps.ndjson")),
        };
        (dir, args)
    }

    #[test]
    fn two_laps_around_a_circle() {
        let (dir, args) = fixture();
        let summary = run(&args, TrackingConfig::default()).unwrap();
        assert_eq!(summary["laps"], 2);

        let laps = iox::import_laps_ndjson(args.laps.as_ref().unwrap()).unwrap();
        assert_eq!(laps.len(), 2);
        assert!(laps[0].time_s > 59.0 && laps[0].time_s < 60.0);
        assert!((laps[1].time_s - 60.0).abs() < 1e-3);

        let out = fs::read_to_string(&args.out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        // header + 156 fixes + the off-track fix; the row without GPS is dropped
        assert_eq!(lines.len(), 158);
        assert!(lines[0].ends_with(",lap_number,lap_elapsed,last_lap_time,corner"));
        assert!(lines[1].ends_with(",north"));
        assert!(lines[32].starts_with("30500,") && lines[32].ends_with(",,,,,,,,"));
        assert!(lines[157].starts_with("155000,"));
        let last: Vec<&str> = lines[157].split(',').collect();
        assert_eq!(last[8], "2");
        assert_eq!(last[11], "south");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn degenerate_track_fails_before_reading_the_log() {
        let (dir, args) = fixture();
        fs::write(args.track_dir.join("points.csv"), "36.58,-121.75\n36.58,-121.75\n").unwrap();
        fs::remove_file(&args.log).unwrap();
        let err = run(&args, TrackingConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("zero-length segment"));
        assert!(!args.out.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
