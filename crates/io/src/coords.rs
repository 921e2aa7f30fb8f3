use model::Point2;

const EARTH_CIRCUMFERENCE_M: f64 = 40_075_017.0;
const METERS_PER_DEGREE: f64 = EARTH_CIRCUMFERENCE_M / 360.0;

/// Geographic to local planar conversion. Track points and log samples must
/// go through the same converter.
pub trait CoordinateConverter {
    fn to_local(&self, lat: f64, lon: f64) -> Point2;
}

/// Equirectangular projection around a reference point: x east, y north,
/// meters. Good enough over the extent of a racetrack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatEarthConverter {
    ref_lat: f64,
    ref_lon: f64,
    meters_per_degree_lon: f64,
}

impl FlatEarthConverter {
    pub fn new(ref_lat: f64, ref_lon: f64) -> Self {
        Self {
            ref_lat,
            ref_lon,
            meters_per_degree_lon: METERS_PER_DEGREE * ref_lat.to_radians().cos(),
        }
    }

    pub fn reference(&self) -> (f64, f64) {
        (self.ref_lat, self.ref_lon)
    }
}

impl CoordinateConverter for FlatEarthConverter {
    fn to_local(&self, lat: f64, lon: f64) -> Point2 {
        Point2::new(
            (lon - self.ref_lon) * self.meters_per_degree_lon,
            (lat - self.ref_lat) * METERS_PER_DEGREE,
        )
    }
}
