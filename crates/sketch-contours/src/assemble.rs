//! Greedy closed-loop assembly.
//!
//! Segments are scanned in input order. A chain starts at the first free
//! segment and repeatedly takes the first free segment with an endpoint
//! within tolerance (per coordinate) of its open end. It closes when the
//! taken segment leads back to the chain start and the chain already holds
//! more than two points. A chain that cannot close releases every segment
//! it took, so they stay available to later chains.

use part_geom::Point2d;
use tracing::{debug, instrument};

use crate::segment::{ContourLoop, Segment2d};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContourError {
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },
}

/// Loops found plus the segments left unconsumed, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourAssembly {
    pub loops: Vec<ContourLoop>,
    pub unconsumed: Vec<usize>,
}

fn validate(segments: &[Segment2d], tolerance: f64) -> Result<(), ContourError> {
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(ContourError::MalformedInput {
            reason: format!("tolerance must be finite and non-negative, got {tolerance}"),
        });
    }
    if let Some(i) = segments.iter().position(|s| !s.is_finite()) {
        return Err(ContourError::MalformedInput {
            reason: format!("segment {i} has a non-finite coordinate"),
        });
    }
    Ok(())
}

enum ChainEnd {
    Closed,
    Open,
}

/// Extend the chain started at `start` until it closes or runs dry.
fn grow_chain(
    segments: &[Segment2d],
    consumed: &mut [bool],
    points: &mut Vec<Point2d>,
    claimed: &mut Vec<usize>,
    tolerance: f64,
) -> ChainEnd {
    let origin = points[0];
    loop {
        let Some(free_end) = points.last().copied() else {
            return ChainEnd::Open;
        };
        let next = segments
            .iter()
            .enumerate()
            .filter(|(i, _)| !consumed[*i])
            .find_map(|(i, s)| s.far_end_from(&free_end, tolerance).map(|far| (i, far)));
        let Some((index, far)) = next else {
            return ChainEnd::Open;
        };
        consumed[index] = true;
        claimed.push(index);
        if far.almost_equal(&origin, tolerance) {
            return if points.len() > 2 {
                ChainEnd::Closed
            } else {
                ChainEnd::Open
            };
        }
        points.push(far);
    }
}

/// Assemble closed loops and report which segments were left over.
#[instrument(skip(segments), fields(segments = segments.len()))]
pub fn assemble(segments: &[Segment2d], tolerance: f64) -> Result<ContourAssembly, ContourError> {
    validate(segments, tolerance)?;
    let mut consumed = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if consumed[start] {
            continue;
        }
        consumed[start] = true;
        let mut points = vec![segments[start].a, segments[start].b];
        let mut claimed = vec![start];
        match grow_chain(segments, &mut consumed, &mut points, &mut claimed, tolerance) {
            ChainEnd::Closed => {
                debug!(start, points = points.len(), "closed loop");
                loops.push(ContourLoop::new(points, claimed));
            }
            ChainEnd::Open => {
                for i in claimed {
                    consumed[i] = false;
                }
            }
        }
    }

    let unconsumed = (0..segments.len()).filter(|i| !consumed[*i]).collect();
    Ok(ContourAssembly { loops, unconsumed })
}

/// Closed loops formed by `segments`, in discovery order.
pub fn find_closed_loops(
    segments: &[Segment2d],
    tolerance: f64,
) -> Result<Vec<ContourLoop>, ContourError> {
    assemble(segments, tolerance).map(|a| a.loops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment2d {
        Segment2d::new(Point2d::new(a.0, a.1), Point2d::new(b.0, b.1))
    }

    #[test]
    fn test_back_and_forth_pair_is_not_a_loop() {
        let segments = [seg((0.0, 0.0), (1.0, 0.0)), seg((1.0, 0.0), (0.0, 0.0))];
        let result = assemble(&segments, 0.1).unwrap();
        assert!(result.loops.is_empty());
        assert_eq!(result.unconsumed, vec![0, 1]);
    }

    #[test]
    fn test_reversed_segment_is_followed() {
        let segments = [
            seg((0.0, 0.0), (1.0, 0.0)),
            seg((1.0, 1.0), (1.0, 0.0)),
            seg((1.0, 1.0), (0.0, 0.0)),
        ];
        let loops = find_closed_loops(&segments, 1e-9).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].points()[2], Point2d::new(1.0, 1.0));
    }

    #[test]
    fn test_linf_tolerance() {
        // 0.09 off in both coordinates: within an L-infinity bound of 0.1
        // though the Euclidean gap is about 0.127.
        let segments = [
            seg((0.0, 0.0), (1.0, 0.0)),
            seg((1.09, 0.09), (1.0, 1.0)),
            seg((1.0, 1.0), (0.0, 0.0)),
        ];
        assert_eq!(find_closed_loops(&segments, 0.1).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let segments = [seg((0.0, 0.0), (1.0, 0.0))];
        assert!(assemble(&segments, f64::NAN).is_err());
        assert!(assemble(&segments, -1.0).is_err());
    }

    #[test]
    fn test_rejects_non_finite_segment() {
        let segments = [seg((0.0, f64::INFINITY), (1.0, 0.0))];
        assert!(matches!(
            assemble(&segments, 0.1),
            Err(ContourError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let result = assemble(&[], 0.1).unwrap();
        assert!(result.loops.is_empty() && result.unconsumed.is_empty());
    }
}
