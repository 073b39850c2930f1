//! Per-frame annotation records and position-series files.
//!
//! Annotation directories hold one `NNNNNN.txt` file per tracked frame, each
//! line `class x_center y_center width height` with coordinates normalized to
//! the frame size. A series CSV is the flattened form: headers `frame,y_center`.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One tracked bounding box, normalized to the frame (0..=1 on both axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationRecord {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl AnnotationRecord {
    /// Build a record from a top-left pixel box `(x, y, w, h)` inside a frame of
    /// `frame_width` x `frame_height` pixels.
    pub fn from_pixel_bbox(bbox: (f64, f64, f64, f64), frame_width: f64, frame_height: f64) -> Self {
        let (x, y, w, h) = bbox;
        Self {
            class_id: 0,
            x_center: (x + w / 2.0) / frame_width,
            y_center: (y + h / 2.0) / frame_height,
            width: w / frame_width,
            height: h / frame_height,
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

impl fmt::Display for AnnotationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

impl FromStr for AnnotationRecord {
    type Err = eyre::Report;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 5 {
            eyre::bail!(
                "annotation line must have 5 fields (class x y w h), got {}",
                parts.len()
            );
        }
        let class_id = parts[0]
            .parse::<u32>()
            .map_err(|e| eyre::eyre!("invalid class id {:?}: {}", parts[0], e))?;
        let mut coords = [0.0f64; 4];
        for (slot, raw) in coords.iter_mut().zip(&parts[1..]) {
            let v = raw
                .parse::<f64>()
                .map_err(|e| eyre::eyre!("invalid coordinate {:?}: {}", raw, e))?;
            if !v.is_finite() {
                eyre::bail!("annotation coordinate {:?} is not finite", raw);
            }
            *slot = v;
        }
        Ok(Self {
            class_id,
            x_center: coords[0],
            y_center: coords[1],
            width: coords[2],
            height: coords[3],
        })
    }
}

fn frame_file_name(frame: usize) -> String {
    format!("{frame:06}.txt")
}

/// Write one frame's record to `dir/NNNNNN.txt`, replacing any previous file.
pub fn write_annotation(dir: &Path, frame: usize, record: &AnnotationRecord) -> eyre::Result<PathBuf> {
    let path = dir.join(frame_file_name(frame));
    std::fs::write(&path, format!("{}\n", record.to_line()))
        .map_err(|e| eyre::eyre!("write annotation {:?}: {}", path, e))?;
    Ok(path)
}

/// Load every record in an annotation directory, ordered by frame number.
///
/// Files whose stem is a frame number are checked for gaps; a gap is logged
/// and the records are still returned back to back, so the resulting series is
/// indexed contiguously from 0.
pub fn load_annotation_dir(dir: &Path) -> eyre::Result<Vec<AnnotationRecord>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| eyre::eyre!("open annotation directory {:?}: {}", dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| eyre::eyre!("list annotation directory {:?}: {}", dir, e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("txt") {
            let frame = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok());
            files.push((frame, path));
        }
    }
    // Numbered files first, by value (names may outgrow the zero padding),
    // then any others by name
    files.sort_by(|(fa, pa), (fb, pb)| {
        fa.is_none()
            .cmp(&fb.is_none())
            .then(fa.cmp(fb))
            .then_with(|| pa.cmp(pb))
    });

    let mut records = Vec::with_capacity(files.len());
    let mut prev_frame: Option<u64> = None;
    let mut gaps = 0usize;
    for (frame, path) in &files {
        if let Some(frame) = *frame {
            if let Some(prev) = prev_frame
                && prev.checked_add(1) != Some(frame)
            {
                gaps += 1;
            }
            prev_frame = Some(frame);
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("read annotation {:?}: {}", path, e))?;
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rec = line
                .parse::<AnnotationRecord>()
                .map_err(|e| eyre::eyre!("{:?} line {}: {}", path, lineno + 1, e))?;
            records.push(rec);
        }
    }
    if gaps > 0 {
        tracing::warn!(
            dir = %dir.display(),
            gaps,
            "annotation frame numbers are not contiguous; series re-indexed"
        );
    }
    Ok(records)
}

/// Position series CSV schema.
///
/// Expected headers:
/// frame,y_center
///
/// Example:
/// frame,y_center
/// 0,0.4121
/// 1,0.4133
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct SeriesRow {
    pub frame: usize,
    pub y_center: f64,
}

pub fn load_series_csv(path: &Path) -> eyre::Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open series CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["frame", "y_center"];
    let actual: Vec<String> = headers.iter().map(|s| s.trim().to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "series CSV must have headers 'frame,y_center', got: {}",
            actual.join(",")
        );
    }

    let mut values = Vec::new();
    for (idx, rec) in rdr.deserialize::<SeriesRow>().enumerate() {
        let row = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        if row.frame != idx {
            eyre::bail!(
                "series CSV row {} has frame {}, expected {} (frames must be contiguous from 0)",
                idx + 2,
                row.frame,
                idx
            );
        }
        if !row.y_center.is_finite() {
            eyre::bail!("series CSV row {} has non-finite y_center", idx + 2);
        }
        values.push(row.y_center);
    }
    Ok(values)
}

pub fn write_series_csv(path: &Path, values: &[f64]) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create series CSV {:?}: {}", path, e))?;
    for (frame, &y_center) in values.iter().enumerate() {
        wtr.serialize(SeriesRow { frame, y_center })
            .map_err(|e| eyre::eyre!("write series CSV {:?}: {}", path, e))?;
    }
    wtr.flush()
        .map_err(|e| eyre::eyre!("flush series CSV {:?}: {}", path, e))?;
    Ok(())
}

/// Position source backed by an annotation directory; y-centers are scaled
/// by `frame_height_px` into pixels.
#[derive(Debug, Clone)]
pub struct AnnotationDirSource {
    pub dir: PathBuf,
    pub frame_height_px: f64,
}

impl AnnotationDirSource {
    pub fn new(dir: impl Into<PathBuf>, frame_height_px: f64) -> Self {
        Self {
            dir: dir.into(),
            frame_height_px,
        }
    }
}

impl oildrop_traits::PositionSource for AnnotationDirSource {
    fn positions(&mut self) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> {
        let records = load_annotation_dir(&self.dir)?;
        Ok(records
            .iter()
            .map(|r| r.y_center * self.frame_height_px)
            .collect())
    }
}

/// Position source backed by a `frame,y_center` CSV; values are multiplied by
/// `scale` (1.0 when the file already holds pixels).
#[derive(Debug, Clone)]
pub struct SeriesCsvSource {
    pub path: PathBuf,
    pub scale: f64,
}

impl SeriesCsvSource {
    pub fn new(path: impl Into<PathBuf>, scale: f64) -> Self {
        Self {
            path: path.into(),
            scale,
        }
    }
}

impl oildrop_traits::PositionSource for SeriesCsvSource {
    fn positions(&mut self) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> {
        let values = load_series_csv(&self.path)?;
        Ok(values.into_iter().map(|v| v * self.scale).collect())
    }
}
