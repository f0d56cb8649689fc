use std::cmp::Ordering;

use crate::util;

/// Selectors rank candidates and optionally truncate the ranked list.
pub trait Selector<C>: Send + Sync
where
    C: Clone + Send + Sync + 'static,
{
    /// Default selection: sort, then truncate to `size()` when set.
    fn select(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Extract the score from a candidate to use for sorting.
    fn score(&self, candidate: &C) -> f64;

    /// Sort candidates by score, descending.
    ///
    /// NaN scores go to the end so they never rank as top candidates. The
    /// sort is stable: equal scores keep their input order.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| {
            let sa = self.score(a);
            let sb = self.score(b);
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
            }
        });
        sorted
    }

    /// Maximum number of candidates to keep. `None` keeps everything.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ByValue(Option<usize>);

    impl Selector<(char, f64)> for ByValue {
        fn score(&self, candidate: &(char, f64)) -> f64 {
            candidate.1
        }

        fn size(&self) -> Option<usize> {
            self.0
        }
    }

    #[test]
    fn nan_sorts_last_and_ties_keep_order() {
        let ranked = ByValue(None).sort(vec![
            ('a', f64::NAN),
            ('b', 1.0),
            ('c', 3.0),
            ('d', 1.0),
        ]);
        let order: Vec<char> = ranked.iter().map(|c| c.0).collect();
        assert_eq!(order, vec!['c', 'b', 'd', 'a']);
    }

    #[test]
    fn select_truncates() {
        let picked = ByValue(Some(2)).select(vec![('a', 1.0), ('b', 2.0), ('c', 3.0)]);
        assert_eq!(picked, vec![('c', 3.0), ('b', 2.0)]);
    }

    #[test]
    fn name_is_short() {
        assert_eq!(ByValue(None).name(), "ByValue");
    }
}
