//! Image preference: a stable partition applied within one tier's
//! candidate batch, never a re-sort by score.

/// Move entries the predicate accepts to the front, keep arrival order
/// within both halves, and cut to `take`. Combined with the padding the
/// partitioner fetches, this lets an illustrated lower-scoring plant
/// displace a bare top one without shrinking the tier.
pub fn prefer_images<T, F>(batch: Vec<T>, take: usize, has_image: F) -> Vec<T>
where
    F: Fn(&T) -> bool,
{
    let (with, without): (Vec<T>, Vec<T>) = batch.into_iter().partition(|item| has_image(item));
    with.into_iter().chain(without).take(take).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entry {
        name: &'static str,
        image: bool,
    }

    fn entry(name: &'static str, image: bool) -> Entry {
        Entry { name, image }
    }

    #[test]
    fn illustrated_entries_come_first_in_arrival_order() {
        let batch = vec![entry("a", false), entry("b", true), entry("c", false), entry("d", true)];
        let out = prefer_images(batch, 4, |e| e.image);
        let names: Vec<&str> = out.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn truncation_drops_bare_entries_before_illustrated_ones() {
        // "a" arrived first (higher score) but has no image; with room for
        // only two, both illustrated entries survive instead.
        let batch = vec![entry("a", false), entry("b", true), entry("c", true)];
        let out = prefer_images(batch, 2, |e| e.image);
        let names: Vec<&str> = out.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn all_bare_batch_is_passed_through() {
        let batch = vec![entry("a", false), entry("b", false)];
        let out = prefer_images(batch, 5, |e| e.image);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "a");
    }

    #[test]
    fn zero_take_empties_the_batch() {
        let batch = vec![entry("a", true)];
        assert!(prefer_images(batch, 0, |e| e.image).is_empty());
    }
}
