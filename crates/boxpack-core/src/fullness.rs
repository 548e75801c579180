//! Enclosed-waste labeling behind the fullness metric.
//!
//! Free regions are labeled by contact: regions reachable through chains of
//! interior overlap from the region anchored at the container's bottom-right
//! corner are "outer" and still usable from the boundary; everything else is
//! an enclosed pocket and counts as waste.

use crate::model::Rect;

/// Transient label for one free region during the sweep.
///
/// The derived ordering matters: `Neutral < Group(_) < Outer`, and groups
/// compare by tag, so propagating the larger mark of a touching pair both
/// spreads the outer label and merges plain groups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Mark {
    Neutral,
    Group(u32),
    Outer,
}

/// Total area of free regions cut off from the bottom-right corner region.
///
/// The contact pass is a single forward sweep over index pairs, not a
/// transitive closure: two groups linked only through a region that appears
/// after both keep their own labels. See `under_merge_keeps_earlier_group`.
pub(crate) fn enclosed_waste(width: f64, height: f64, free: &[Rect]) -> f64 {
    let mut marks = vec![Mark::Neutral; free.len()];
    for (mark, region) in marks.iter_mut().zip(free) {
        if region.right() == width && region.bottom() == height {
            *mark = Mark::Outer;
        }
    }

    let mut next_tag = 0u32;
    for i in 0..free.len() {
        for j in (i + 1)..free.len() {
            if !free[i].touches(&free[j]) {
                continue;
            }
            if marks[i] == Mark::Neutral && marks[j] == Mark::Neutral {
                marks[i] = Mark::Group(next_tag);
                marks[j] = Mark::Group(next_tag);
                next_tag += 1;
            } else {
                let merged = marks[i].max(marks[j]);
                marks[i] = merged;
                marks[j] = merged;
            }
        }
    }

    free.iter()
        .zip(&marks)
        .filter(|(_, mark)| **mark != Mark::Outer)
        .map(|(region, _)| region.area())
        .sum()
}
