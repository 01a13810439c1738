use crate::config::GapClosing;
use crate::error::AlignmentError;
use crate::types::{AlignedWord, TimingSide, WordSlot};

/// Fills every missing `start`/`end` by piecewise-linear interpolation over
/// slot positions. Starts and ends are interpolated independently, so a
/// filled word may end before it starts.
pub fn interpolate(
    slots: Vec<WordSlot>,
    gap_closing: GapClosing,
) -> Result<Vec<AlignedWord>, AlignmentError> {
    let slots = match gap_closing {
        GapClosing::Neighbours => close_neighbour_gaps(&slots),
        GapClosing::Disabled => slots,
    };

    let starts = fill_side(slots.iter().map(|s| s.start).collect(), TimingSide::Start)?;
    let ends = fill_side(slots.iter().map(|s| s.end).collect(), TimingSide::End)?;

    Ok(slots
        .into_iter()
        .zip(starts.into_iter().zip(ends))
        .map(|(slot, (start, end))| AlignedWord {
            start,
            end,
            word: slot.word,
        })
        .collect())
}

/// Snaps a timed start to the previous slot's end and a timed end to the
/// next slot's start. Lookups read the untouched input, never values
/// rewritten earlier in the same pass.
pub fn close_neighbour_gaps(slots: &[WordSlot]) -> Vec<WordSlot> {
    let last = slots.len().saturating_sub(1);
    slots
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            let mut closed = slot.clone();
            if idx > 0 && slot.start.is_some() {
                if let Some(prev_end) = slots[idx - 1].end {
                    closed.start = Some(prev_end);
                }
            }
            if idx < last && slot.end.is_some() {
                if let Some(next_start) = slots[idx + 1].start {
                    closed.end = Some(next_start);
                }
            }
            closed
        })
        .collect()
}

fn fill_side(values: Vec<Option<f64>>, side: TimingSide) -> Result<Vec<f64>, AlignmentError> {
    let missing = values.iter().filter(|v| v.is_none()).count();
    let (xs, ys): (Vec<f64>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.map(|value| (idx as f64, value)))
        .unzip();

    tracing::debug!(
        side = %side,
        knots = xs.len(),
        missing,
        "interpolate: knots collected"
    );

    if missing == 0 {
        return Ok(values.into_iter().flatten().collect());
    }
    if xs.len() < 2 {
        return Err(AlignmentError::insufficient_timing(side, xs.len()));
    }

    Ok(values
        .into_iter()
        .enumerate()
        .map(|(idx, v)| v.unwrap_or_else(|| linear_interpolate(idx as f64, &xs, &ys)))
        .collect())
}

/// Piecewise-linear value at `x` through knots `(xs, ys)`; `xs` must be
/// strictly increasing with at least two entries. Outside the knot range the
/// nearest segment is extended.
pub fn linear_interpolate(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert!(xs.len() >= 2 && xs.len() == ys.len());
    let upper = xs.partition_point(|&knot| knot <= x).clamp(1, xs.len() - 1);
    let lower = upper - 1;
    let (x0, x1) = (xs[lower], xs[upper]);
    let (y0, y1) = (ys[lower], ys[upper]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(word: &str, start: f64, end: f64) -> WordSlot {
        WordSlot {
            word: word.to_string(),
            start: Some(start),
            end: Some(end),
        }
    }

    fn untimed(word: &str) -> WordSlot {
        WordSlot {
            word: word.to_string(),
            ..WordSlot::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn linear_interpolate_inside_and_outside() {
        let xs = [0.0, 2.0, 4.0];
        let ys = [1.0, 2.0, 4.0];
        assert!(approx(linear_interpolate(1.0, &xs, &ys), 1.5));
        assert!(approx(linear_interpolate(3.0, &xs, &ys), 3.0));
        assert!(approx(linear_interpolate(2.0, &xs, &ys), 2.0));
        // extrapolation continues the nearest segment, no clamping
        assert!(approx(linear_interpolate(-1.0, &xs, &ys), 0.5));
        assert!(approx(linear_interpolate(5.0, &xs, &ys), 5.0));
    }

    #[test]
    fn fully_timed_slots_pass_through() {
        let slots = vec![
            timed("There", 1.0, 1.2),
            timed("was", 1.2, 1.3),
            timed("a", 1.3, 1.35),
        ];
        let words = interpolate(slots, GapClosing::Neighbours).unwrap();
        assert_eq!(words[0], AlignedWord { start: 1.0, end: 1.2, word: "There".into() });
        assert!(approx(words[2].end, 1.35));
    }

    #[test]
    fn single_gap_between_evenly_paced_words_closes_exactly() {
        let slots = vec![
            timed("There", 1.0, 1.2),
            untimed("is"),
            timed("a", 1.4, 1.6),
            timed("day", 1.6, 1.8),
        ];
        let words = interpolate(slots, GapClosing::Neighbours).unwrap();
        assert_eq!(words[1].word, "is");
        assert!(approx(words[1].start, 1.2));
        assert!(approx(words[1].end, 1.4));
    }

    #[test]
    fn gap_closing_snaps_timed_neighbours() {
        let slots = vec![timed("a", 0.0, 1.0), timed("b", 1.5, 2.0), timed("c", 2.5, 3.0)];
        let closed = close_neighbour_gaps(&slots);
        // interior slot takes both neighbours' boundaries
        assert_eq!(closed[1].start, Some(1.0));
        assert_eq!(closed[1].end, Some(2.5));
        // first start and last end are never moved
        assert_eq!(closed[0].start, Some(0.0));
        assert_eq!(closed[0].end, Some(1.5));
        assert_eq!(closed[2].start, Some(2.0));
        assert_eq!(closed[2].end, Some(3.0));
    }

    #[test]
    fn gap_closing_ignores_untimed_neighbours() {
        let slots = vec![timed("a", 0.0, 1.0), untimed("b"), timed("c", 2.5, 3.0)];
        let closed = close_neighbour_gaps(&slots);
        assert_eq!(closed, slots);
    }

    #[test]
    fn disabled_gap_closing_keeps_stt_boundaries() {
        let slots = vec![timed("a", 0.0, 1.0), timed("b", 1.5, 2.0)];
        let words = interpolate(slots, GapClosing::Disabled).unwrap();
        assert!(approx(words[0].end, 1.0));
        assert!(approx(words[1].start, 1.5));
    }

    #[test]
    fn leading_and_trailing_gaps_extrapolate() {
        let slots = vec![
            untimed("So"),
            timed("there", 1.0, 1.5),
            timed("was", 2.0, 2.5),
            untimed("rain."),
        ];
        let words = interpolate(slots, GapClosing::Disabled).unwrap();
        assert!(approx(words[0].start, 0.0));
        assert!(approx(words[0].end, 0.5));
        assert!(approx(words[3].start, 3.0));
        assert!(approx(words[3].end, 3.5));
    }

    #[test]
    fn single_knot_with_missing_values_fails() {
        let slots = vec![timed("a", 0.0, 1.0), untimed("b")];
        let err = interpolate(slots, GapClosing::Neighbours).unwrap_err();
        match err {
            AlignmentError::InsufficientTimingData { side, knots } => {
                assert_eq!(side, TimingSide::Start);
                assert_eq!(knots, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_knots_fails() {
        let slots = vec![untimed("a"), untimed("b")];
        assert!(matches!(
            interpolate(slots, GapClosing::Neighbours),
            Err(AlignmentError::InsufficientTimingData { knots: 0, .. })
        ));
    }

    #[test]
    fn single_timed_slot_needs_no_knots() {
        let words = interpolate(vec![timed("a", 0.2, 0.4)], GapClosing::Neighbours).unwrap();
        assert_eq!(words.len(), 1);
        assert!(approx(words[0].start, 0.2));
    }

    #[test]
    fn interior_fill_keeps_order_between_sane_neighbours() {
        let slots = vec![timed("a", 0.0, 5.0), untimed("b"), timed("c", 6.0, 6.1)];
        let words = interpolate(slots, GapClosing::Disabled).unwrap();
        assert!(approx(words[1].start, 3.0));
        assert!(approx(words[1].end, 5.55));
        assert!(words[1].start <= words[1].end);
    }

    #[test]
    fn trailing_extrapolation_can_invert_a_word() {
        // Shrinking durations extrapolate below zero.
        let slots = vec![
            timed("a", 0.0, 1.0),
            timed("b", 1.0, 1.1),
            untimed("c"),
            untimed("d"),
        ];
        let words = interpolate(slots, GapClosing::Disabled).unwrap();
        assert!(approx(words[3].start, 3.0));
        assert!(approx(words[3].end, 1.3));
        assert!(words[3].end < words[3].start);
    }
}
