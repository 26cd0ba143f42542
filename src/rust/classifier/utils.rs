/// Index of the largest score. Ties resolve to the first occurrence and NaN
/// scores never win. Returns `None` when there is no comparable score.
///
/// This deliberately differs from `numpy.argmax`, which returns the position
/// of the first NaN.
pub(crate) fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
    }

    #[test]
    fn test_argmax_ties_prefer_first() {
        assert_eq!(argmax(&[0.25, 0.5, 0.5, 0.1]), Some(1));
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.2, f32::NAN, 0.3]), Some(3));
    }

    #[test]
    fn test_argmax_without_comparable_scores() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN, f32::NAN]), None);
    }
}
