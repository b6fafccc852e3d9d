//! Point input: JSON rows in data space, projected to pixel space.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use heatmap_common::{Extent, HeatmapError, HeatmapResult, LinearAxis, Point, PointSet};

/// Read and parse a points file.
pub fn load_points(path: &Path) -> HeatmapResult<PointSet> {
    let content = std::fs::read_to_string(path)?;
    parse_points(&content)
}

/// Parse `[[x, y, value], ...]` or `{ "data": [[x, y, value], ...] }`.
///
/// Columns past the third are ignored. `null` and `"-"` mark missing
/// values; rows with a missing or non-finite value are skipped.
pub fn parse_points(json: &str) -> HeatmapResult<PointSet> {
    let doc: Value = serde_json::from_str(json)?;
    let rows = match &doc {
        Value::Array(rows) => rows,
        Value::Object(map) => map.get("data").and_then(Value::as_array).ok_or_else(|| {
            HeatmapError::InvalidInput("expected an object with a \"data\" array".to_string())
        })?,
        _ => {
            return Err(HeatmapError::InvalidInput(
                "expected an array of [x, y, value] rows".to_string(),
            ))
        }
    };

    let mut points = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let cells = row
            .as_array()
            .ok_or_else(|| HeatmapError::InvalidInput(format!("row {} is not an array", index)))?;
        if cells.len() < 3 {
            return Err(HeatmapError::InvalidInput(format!(
                "row {} has {} values, expected at least 3",
                index,
                cells.len()
            )));
        }

        let mut triple = [0.0; 3];
        for (slot, cell) in triple.iter_mut().zip(cells) {
            *slot = cell_value(cell).ok_or_else(|| {
                HeatmapError::InvalidInput(format!("row {} has a non-numeric value: {}", index, cell))
            })?;
        }

        let point = Point::from(triple);
        if !point.is_finite() {
            debug!(row = index, "Skipping point with missing value");
            skipped += 1;
            continue;
        }
        points.push(point);
    }

    if skipped > 0 {
        warn!(skipped, kept = points.len(), "Skipped points with missing or non-finite values");
    }

    Ok(points)
}

fn cell_value(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(f64::NAN),
        Value::String(s) if s == "-" => Some(f64::NAN),
        _ => None,
    }
}

/// Axes mapping the data extents onto a `width x height` image, y up.
///
/// A missing extent is taken from the points; with no points at all it
/// defaults to `[0, 1]`.
pub fn axes_for(
    points: &[Point],
    width: u32,
    height: u32,
    x_extent: Option<Extent>,
    y_extent: Option<Extent>,
) -> (LinearAxis, LinearAxis) {
    let unit = Extent::new(0.0, 1.0);
    let x_extent = x_extent
        .or_else(|| Extent::of_values(points.iter().map(|p| p.x)))
        .unwrap_or(unit);
    let y_extent = y_extent
        .or_else(|| Extent::of_values(points.iter().map(|p| p.y)))
        .unwrap_or(unit);

    let x_axis = LinearAxis::new(x_extent, [0.0, width as f64]);
    let mut y_axis = LinearAxis::new(y_extent, [0.0, height as f64]);
    // Image rows grow downward
    y_axis.reverse();

    (x_axis, y_axis)
}

/// Map points from data space to pixel space. Values are unchanged.
pub fn project(points: &[Point], x_axis: &LinearAxis, y_axis: &LinearAxis) -> PointSet {
    points
        .iter()
        .map(|p| Point::new(x_axis.data_to_coord(p.x), y_axis.data_to_coord(p.y), p.value))
        .collect()
}
