use anyhow::{Context, Result};
use model::CompletedLap;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

pub mod coords;
pub mod log_reader;
pub mod output;
pub mod track_dir;

pub use coords::{CoordinateConverter, FlatEarthConverter};
pub use log_reader::{find_column, LogLine, LogReader, TimestampFormat};
pub use output::{AnnotatedWriter, ANNOTATION_COLUMNS};
pub use track_dir::{load_track_dir, TrackDefinition};

pub fn import_laps_ndjson(path: &Path) -> Result<Vec<CompletedLap>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = BufReader::new(f);
    let mut laps = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let s = line?;
        if s.trim().is_empty() {
            continue;
        }
        let l: CompletedLap =
            serde_json::from_str(&s).with_context(|| format!("{}:{}", path.display(), i + 1))?;
        laps.push(l);
    }
    Ok(laps)
}

pub fn export_laps_ndjson(laps: &[CompletedLap], path: &Path) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for l in laps {
        let s = serde_json::to_string(l)?;
        writeln!(w, "{}", s)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_laps_ndjson() {
        let path = std::env::temp_dir().join(format!("lapcalc-laps-{}.ndjson", Uuid::new_v4()));
        let laps = vec![
            CompletedLap { id: Uuid::new_v4(), number: 1, start_s: 12.5, time_s: 98.25 },
            CompletedLap { id: Uuid::new_v4(), number: 2, start_s: 110.75, time_s: 97.5 },
        ];
        export_laps_ndjson(&laps, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains(&laps[0].id.simple().to_string()));

        assert_eq!(import_laps_ndjson(&path).unwrap(), laps);
        std::fs::remove_file(&path).unwrap();
    }
}
