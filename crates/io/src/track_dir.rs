use crate::coords::{CoordinateConverter, FlatEarthConverter};
use anyhow::{bail, Context, Result};
use model::{CornerTable, Point2};
use std::{fs, path::Path};
use tracing::info;

pub const REFERENCE_FILE: &str = "track.txt";
pub const POINTS_FILE: &str = "points.csv";
pub const CORNERS_FILE: &str = "corners.json";

/// Everything a track directory describes, already in local coordinates.
#[derive(Clone, Debug)]
pub struct TrackDefinition {
    pub converter: FlatEarthConverter,
    pub points: Vec<Point2>,
    pub corners: CornerTable,
}

pub fn load_track_dir(dir: &Path) -> Result<TrackDefinition> {
    let (ref_lat, ref_lon) = read_reference(&dir.join(REFERENCE_FILE))?;
    let converter = FlatEarthConverter::new(ref_lat, ref_lon);
    let points = read_points(&dir.join(POINTS_FILE), &converter)?;

    let corners_path = dir.join(CORNERS_FILE);
    let corners = if corners_path.exists() {
        let s = fs::read_to_string(&corners_path)
            .with_context(|| format!("read {}", corners_path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", corners_path.display()))?
    } else {
        CornerTable::default()
    };

    info!(
        dir = %dir.display(),
        points = points.len(),
        corners = corners.corners.len(),
        "track definition loaded"
    );
    Ok(TrackDefinition { converter, points, corners })
}

/// `lat,lon` on the first line.
fn read_reference(path: &Path) -> Result<(f64, f64)> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let line = s.lines().next().unwrap_or("").trim();
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        bail!("{}: expected `lat,lon`, got `{}`", path.display(), line);
    }
    let lat: f64 = parts[0].parse().with_context(|| format!("{}: bad latitude", path.display()))?;
    let lon: f64 = parts[1].parse().with_context(|| format!("{}: bad longitude", path.display()))?;
    Ok((lat, lon))
}

/// Headerless `lat,lon` rows in course order.
fn read_points<C: CoordinateConverter>(path: &Path, converter: &C) -> Result<Vec<Point2>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let mut points = Vec::new();
    for (i, rec) in rdr.deserialize().enumerate() {
        let (lat, lon): (f64, f64) =
            rec.with_context(|| format!("{}: row {}", path.display(), i + 1))?;
        points.push(converter.to_local(lat, lon));
    }
    Ok(points)
}
