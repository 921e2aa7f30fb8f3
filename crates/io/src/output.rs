use anyhow::{Context, Result};
use csv::StringRecord;
use model::TrackRecord;
use std::{fs::File, io::Write, path::Path};

/// Columns appended after the pass-through input columns.
pub const ANNOTATION_COLUMNS: [&str; 8] = [
    "distance_from_start",
    "cross_track",
    "x",
    "y",
    "lap_number",
    "lap_elapsed",
    "last_lap_time",
    "corner",
];

/// Writes each input row back out followed by its track annotations.
pub struct AnnotatedWriter<W: Write> {
    w: csv::Writer<W>,
}

impl AnnotatedWriter<File> {
    pub fn create(path: &Path, input_headers: &StringRecord) -> Result<Self> {
        let w = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("create {}", path.display()))?;
        Self::start(w, input_headers)
    }
}

impl<W: Write> AnnotatedWriter<W> {
    pub fn from_writer(inner: W, input_headers: &StringRecord) -> Result<Self> {
        Self::start(csv::WriterBuilder::new().flexible(true).from_writer(inner), input_headers)
    }

    fn start(mut w: csv::Writer<W>, input_headers: &StringRecord) -> Result<Self> {
        w.write_record(input_headers.iter().chain(ANNOTATION_COLUMNS))?;
        Ok(Self { w })
    }

    pub fn write(&mut self, raw: &StringRecord, rec: &TrackRecord) -> Result<()> {
        let extra: [String; 8] = match &rec.on_track {
            Some(on) => [
                format!("{:.3}", on.distance_from_start_m),
                format!("{:.3}", on.cross_track_m),
                format!("{:.3}", rec.position.x),
                format!("{:.3}", rec.position.y),
                on.lap_number.to_string(),
                format!("{:.3}", on.lap_elapsed_s),
                format!("{:.3}", on.last_lap_time_s),
                on.corner.clone(),
            ],
            None => Default::default(),
        };
        self.w.write_record(raw.iter().chain(extra.iter().map(String::as_str)))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.w.flush()?;
        self.w.into_inner().map_err(|e| anyhow::anyhow!("flush output: {}", e.error()))
    }
}
