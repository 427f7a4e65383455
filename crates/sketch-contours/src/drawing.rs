use part_geom::Point2d;
use serde::Serialize;

use crate::assemble::{find_closed_loops, ContourError};
use crate::segment::{ContourLoop, Segment2d};

/// Dimension annotation: a measured segment and its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionLine {
    pub segment: Segment2d,
    pub label: String,
}

/// Length label in millimetres with at most three decimals, e.g. `"141.421mm"`.
fn length_label(length: f64) -> String {
    let text = format!("{length:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}mm")
}

/// A 2D sketch: free points, lines and dimension annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SketchDrawing {
    points: Vec<Point2d>,
    lines: Vec<Segment2d>,
    dimensions: Vec<DimensionLine>,
}

impl SketchDrawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, point: Point2d) {
        self.points.push(point);
    }

    /// Add a line; both endpoints are recorded as points too.
    pub fn add_line(&mut self, segment: Segment2d) {
        self.add_point(segment.a);
        self.add_point(segment.b);
        self.lines.push(segment);
    }

    /// Lines joining consecutive points, plus a closing line when `closed`.
    pub fn add_polyline(&mut self, points: &[Point2d], closed: bool) {
        for pair in points.windows(2) {
            self.add_line(Segment2d::new(pair[0], pair[1]));
        }
        if let (true, Some(first), Some(last)) = (closed && points.len() > 2, points.first(), points.last()) {
            self.add_line(Segment2d::new(*last, *first));
        }
    }

    pub fn add_dimension_line(&mut self, segment: Segment2d) {
        self.dimensions.push(DimensionLine {
            segment,
            label: length_label(segment.length()),
        });
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
        self.dimensions.clear();
    }

    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    pub fn lines(&self) -> &[Segment2d] {
        &self.lines
    }

    pub fn dimensions(&self) -> &[DimensionLine] {
        &self.dimensions
    }

    /// Closed loops formed by the sketch lines.
    pub fn closed_contours(&self, tolerance: f64) -> Result<Vec<ContourLoop>, ContourError> {
        find_closed_loops(&self.lines, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_records_points() {
        let mut s = SketchDrawing::new();
        s.add_line(Segment2d::new(Point2d::new(0.0, 0.0), Point2d::new(3.0, 4.0)));
        assert_eq!(s.points().len(), 2);
        assert_eq!(s.lines().len(), 1);
    }

    #[test]
    fn test_dimension_label() {
        let mut s = SketchDrawing::new();
        s.add_dimension_line(Segment2d::new(Point2d::new(300.0, 300.0), Point2d::new(200.0, 200.0)));
        s.add_dimension_line(Segment2d::new(Point2d::new(0.0, 0.0), Point2d::new(0.0, 200.0)));
        assert_eq!(s.dimensions()[0].label, "141.421mm");
        assert_eq!(s.dimensions()[1].label, "200mm");
    }

    #[test]
    fn test_closed_polyline_forms_one_contour() {
        let mut s = SketchDrawing::new();
        s.add_polyline(
            &[
                Point2d::new(0.0, 0.0),
                Point2d::new(4.0, 0.0),
                Point2d::new(4.0, 2.0),
                Point2d::new(0.0, 2.0),
            ],
            true,
        );
        let contours = s.closed_contours(0.1).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
        assert!(contours[0].signed_area() > 0.0);
        s.clear();
        assert!(s.lines().is_empty() && s.points().is_empty());
    }
}
