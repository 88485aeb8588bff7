//! Pure selection helpers shared by the pipelines.

/// Keep the first `n` items, preserving rank order.
#[must_use]
pub fn top_n<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    items.truncate(n);
    items
}

/// Keep items whose rating is at least `threshold`, preserving their
/// relative order.
pub fn filter_by_rating<T>(
    items: impl IntoIterator<Item = T>,
    threshold: u8,
    rating: impl Fn(&T) -> Option<u8>,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| rating(item).is_some_and(|r| r >= threshold))
        .collect()
}

/// Pick the image exactly `target` pixels wide, falling back to the first
/// candidate. Returns `None` only for an empty slice.
pub fn best_fit_image<T>(
    candidates: &[T],
    target: u32,
    width: impl Fn(&T) -> Option<u32>,
) -> Option<&T> {
    candidates
        .iter()
        .find(|c| width(c) == Some(target))
        .or_else(|| candidates.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(ws: &[u32]) -> Vec<Option<u32>> {
        ws.iter().copied().map(Some).collect()
    }

    #[test]
    fn exact_width_wins() {
        let images = widths(&[640, 100, 320]);
        assert_eq!(best_fit_image(&images, 320, |w| *w), Some(&Some(320)));
    }

    #[test]
    fn without_exact_match_the_first_candidate_is_used() {
        let images = widths(&[100, 640]);
        assert_eq!(best_fit_image(&images, 320, |w| *w), Some(&Some(100)));

        let images = widths(&[640, 64, 160]);
        assert_eq!(best_fit_image(&images, 320, |w| *w), Some(&Some(640)));
    }

    #[test]
    fn candidates_without_widths_fall_back_to_first() {
        let no_widths = vec![None, Some(160)];
        assert_eq!(
            best_fit_image(&no_widths, 320, |w: &Option<u32>| *w),
            Some(&None)
        );
    }

    #[test]
    fn empty_candidates_yield_none() {
        let images: Vec<Option<u32>> = Vec::new();
        assert_eq!(best_fit_image(&images, 320, |w| *w), None);
    }

    #[test]
    fn rating_filter_keeps_order() {
        let ratings = vec![("a", 5), ("b", 9), ("c", 10), ("d", 9)];
        let kept = filter_by_rating(ratings, 9, |(_, r)| Some(*r));
        assert_eq!(kept, vec![("b", 9), ("c", 10), ("d", 9)]);
    }

    #[test]
    fn rating_filter_drops_unrated() {
        let kept = filter_by_rating(vec![Some(10), None], 9, |r| *r);
        assert_eq!(kept, vec![Some(10)]);
    }

    #[test]
    fn top_n_keeps_the_first_n_in_order() {
        let ranked: Vec<u32> = (1..=20).collect();
        let top = top_n(ranked, 15);
        assert_eq!(top, (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn top_n_with_fewer_items_keeps_all() {
        assert_eq!(top_n(vec!["x", "y"], 15), vec!["x", "y"]);
    }
}
