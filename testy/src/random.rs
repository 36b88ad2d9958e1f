use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{Error, ErrorDetails};

pub trait RandomOrder: IntoIterator + Sized {
    /// Collects the items into a `Vec` in random order.
    fn in_random_order(self) -> Vec<Self::Item> {
        let mut items: Vec<_> = self.into_iter().collect();
        items.shuffle(&mut rand::rng());
        items
    }
}

impl<I: IntoIterator> RandomOrder for I {}

/// Picks `count` items at random (with replacement) from `items`.
pub fn random_picks_from<T: Clone>(
    count: usize,
    items: impl IntoIterator<Item = T>,
) -> Result<Vec<T>, Error> {
    let items: Vec<T> = items.into_iter().collect();
    if items.is_empty() {
        return Err(Error::new(ErrorDetails::EmptyPickSource {
            count,
            item_type: std::any::type_name::<T>(),
        }));
    }
    let mut rng = rand::rng();
    Ok((0..count)
        .map(|_| items[rng.random_range(0..items.len())].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_random_order_keeps_all_items() {
        let mut shuffled = (0..100).in_random_order();
        assert_eq!(shuffled.len(), 100);
        shuffled.sort_unstable();
        assert_eq!(shuffled, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_in_random_order_empty() {
        assert!(Vec::<u8>::new().in_random_order().is_empty());
    }

    #[test]
    fn test_random_picks_come_from_source() {
        let source = ["a", "b", "c"];
        let picks = random_picks_from(50, source).unwrap();
        assert_eq!(picks.len(), 50);
        assert!(picks.iter().all(|pick| source.contains(pick)));
    }

    #[test]
    fn test_random_picks_from_empty_source() {
        let error = random_picks_from(0, Vec::<u32>::new()).unwrap_err();
        assert!(matches!(
            error.get_details(),
            ErrorDetails::EmptyPickSource {
                count: 0,
                item_type: "u32"
            }
        ));
        assert_eq!(
            error.to_string(),
            "Cannot make 0 random picks from list of u32 because it is empty"
        );
    }
}
