use std::cell::Cell;

use tracing::{debug, instrument, trace};

use crate::fullness::enclosed_waste;
use crate::model::{BoxSpec, PackStats, Placement, Rect};

/// Greedy rectangle packer for a single fixed-size container.
///
/// Boxes are queued with [`add_box`](Packer::add_box) and divided by
/// [`pack`](Packer::pack) into placed, unplaced and rejected sets; no
/// operation fails. Placement keeps a list of free rectangles, scores every
/// remaining box against every region in both orientations and commits the
/// single best candidate per round, so earlier placements steer later ones.
pub struct Packer<K = String> {
    width: f64,
    height: f64,
    boxes: Vec<BoxSpec<K>>,
    queue: Vec<BoxSpec<K>>,
    placed: Vec<Placement<K>>,
    unplaced: Vec<BoxSpec<K>>,
    rejected: Vec<BoxSpec<K>>,
    free: Vec<Rect>,
    fullness: Cell<Option<f64>>,
    dirty: bool,
}

struct Candidate {
    rect: Rect,
    rotated: bool,
    score: f64,
}

impl<K: Clone> Packer<K> {
    /// Creates a packer for a `width` x `height` container.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            boxes: Vec::new(),
            queue: Vec::new(),
            placed: Vec::new(),
            unplaced: Vec::new(),
            rejected: Vec::new(),
            free: Vec::new(),
            fullness: Cell::new(None),
            dirty: true,
        }
    }

    pub fn container_width(&self) -> f64 {
        self.width
    }

    pub fn container_height(&self) -> f64 {
        self.height
    }

    /// Changes the container dimensions in place.
    ///
    /// Existing placements and free regions are kept as they are; only the
    /// fullness cache is invalidated, since regions may gain or lose contact
    /// with the new outer boundary. The new size takes effect for placement
    /// when boxes are added or the packer is cleared.
    pub fn resize_container(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.fullness.set(None);
    }

    /// Queues a box for the next run.
    ///
    /// The size is stored in canonical orientation; `key` is echoed on the
    /// matching output entry.
    pub fn add_box(&mut self, width: f64, height: f64, key: K) {
        self.boxes.push(BoxSpec::new(width, height, key));
        self.dirty = true;
        self.fullness.set(None);
    }

    /// Number of boxes currently queued as input.
    pub fn pending_count(&self) -> usize {
        self.boxes.len()
    }

    /// Drops all queued boxes and derived state; the container size stays.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.queue.clear();
        self.placed.clear();
        self.unplaced.clear();
        self.rejected.clear();
        self.free.clear();
        self.fullness.set(None);
        self.dirty = true;
    }

    pub fn placed(&self) -> &[Placement<K>] {
        &self.placed
    }

    pub fn unplaced(&self) -> &[BoxSpec<K>] {
        &self.unplaced
    }

    pub fn rejected(&self) -> &[BoxSpec<K>] {
        &self.rejected
    }

    /// Number of free rectangles currently tracked.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Occupancy ratio in `[0, 1]`.
    ///
    /// Free space still reachable from the container's outer boundary does
    /// not count against fullness; enclosed pockets do. An empty packer
    /// reports 1. The value is cached until boxes are added, the container
    /// is resized or the packer is cleared.
    pub fn fullness(&self) -> f64 {
        if let Some(value) = self.fullness.get() {
            return value;
        }
        let waste = enclosed_waste(self.width, self.height, &self.free);
        let placed_area: f64 = self.placed.iter().map(|p| p.rect.area()).sum();
        let total = placed_area + waste;
        let value = if total > 0.0 { 1.0 - waste / total } else { 1.0 };
        self.fullness.set(Some(value));
        value
    }

    /// Snapshot of counts, areas and fullness.
    pub fn stats(&self) -> PackStats {
        PackStats {
            placed: self.placed.len(),
            unplaced: self.unplaced.len(),
            rejected: self.rejected.len(),
            placed_area: self.placed.iter().map(|p| p.rect.area()).sum(),
            enclosed_waste: enclosed_waste(self.width, self.height, &self.free),
            fullness: self.fullness(),
        }
    }

    /// Runs the placement loop and returns the committed placements.
    ///
    /// Preparation (filtering, sorting, free-space seeding) runs
    /// automatically when boxes were added since the last run; calling
    /// `pack` again without new boxes returns the same result.
    #[instrument(skip_all)]
    pub fn pack(&mut self) -> &[Placement<K>] {
        if self.dirty {
            self.prepare();
        }

        loop {
            // Re-score every remaining box against the current free set and
            // commit the single best placement. Zero scores never place.
            let mut best: Option<(usize, Candidate)> = None;
            for (idx, spec) in self.queue.iter().enumerate() {
                if let Some(candidate) = self.best_candidate(spec) {
                    if candidate.score > best.as_ref().map_or(0.0, |(_, b)| b.score) {
                        best = Some((idx, candidate));
                    }
                }
            }
            let Some((idx, winner)) = best else { break };

            let spec = self.queue.remove(idx);
            trace!(
                left = winner.rect.left,
                top = winner.rect.top,
                rotated = winner.rotated,
                score = winner.score,
                "placed"
            );
            self.placed.push(Placement {
                key: spec.key,
                rect: winner.rect,
                rotated: winner.rotated,
            });
            self.split_free(&winner.rect);
        }

        if !self.queue.is_empty() {
            debug!(count = self.queue.len(), "leftover boxes had no scoring position");
            self.unplaced.append(&mut self.queue);
        }
        &self.placed
    }

    /// Rebuilds the working state from the queued boxes.
    fn prepare(&mut self) {
        self.queue.clear();
        self.placed.clear();
        self.unplaced.clear();
        self.rejected.clear();
        self.fullness.set(None);

        for spec in &self.boxes {
            let never_fits = (spec.width > self.width && spec.width > self.height)
                || (spec.height > self.width && spec.height > self.height);
            if spec.width <= 0.0 || spec.height <= 0.0 || never_fits {
                self.rejected.push(spec.clone());
            } else {
                self.queue.push(spec.clone());
            }
        }
        // Large boxes first; the sort is stable, so ties keep insertion order.
        self.queue.sort_by(|a, b| {
            b.width
                .total_cmp(&a.width)
                .then_with(|| b.height.total_cmp(&a.height))
        });

        self.free.clear();
        self.free.push(Rect::of_size(self.width, self.height));
        self.dirty = false;

        debug!(
            queued = self.queue.len(),
            rejected = self.rejected.len(),
            "prepared"
        );
    }

    /// Best-scoring valid position for `spec` over the current free set.
    ///
    /// Both orientations are tried per region; only a strictly better score
    /// replaces the current best, so scan order (free regions in list order,
    /// stored orientation before swapped) breaks ties.
    fn best_candidate(&self, spec: &BoxSpec<K>) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for region in &self.free {
            for (w, h, rotated) in [
                (spec.width, spec.height, false),
                (spec.height, spec.width, true),
            ] {
                if w > region.width || h > region.height {
                    continue;
                }
                let rect = Rect::new(region.left, region.top, w, h);
                let score = self.contact_score(&rect);
                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(Candidate { rect, rotated, score });
                }
            }
        }
        best
    }

    /// Contact score for a candidate position: summed edge lengths shared
    /// with the container boundary plus seam intervals shared with placed
    /// rectangles.
    fn contact_score(&self, node: &Rect) -> f64 {
        let mut score = 0.0;
        if node.left == 0.0 || node.right() == self.width {
            score += node.height;
        }
        if node.top == 0.0 || node.bottom() == self.height {
            score += node.width;
        }
        for placed in &self.placed {
            let other = &placed.rect;
            if node.left == other.right() || node.right() == other.left {
                score += overlap_1d(node.top, node.bottom(), other.top, other.bottom());
            }
            if node.top == other.bottom() || node.bottom() == other.top {
                score += overlap_1d(node.left, node.right(), other.left, other.right());
            }
        }
        score
    }

    /// Replaces every free region the committed rect intrudes on with its
    /// residuals: full-width strips above and below, side strips clipped to
    /// the vertical overlap band. Empty residuals are dropped.
    fn split_free(&mut self, node: &Rect) {
        let mut next_free: Vec<Rect> = Vec::with_capacity(self.free.len() + 3);
        for region in &self.free {
            if !region.overlaps(node) {
                next_free.push(*region);
                continue;
            }
            let band_left = region.left.max(node.left);
            let band_top = region.top.max(node.top);
            let band_right = region.right().min(node.right());
            let band_bottom = region.bottom().min(node.bottom());

            // above
            if band_top > region.top {
                next_free.push(Rect::new(
                    region.left,
                    region.top,
                    region.width,
                    band_top - region.top,
                ));
            }
            // below
            if band_bottom < region.bottom() {
                next_free.push(Rect::new(
                    region.left,
                    band_bottom,
                    region.width,
                    region.bottom() - band_bottom,
                ));
            }
            // left of the band
            if band_left > region.left && band_bottom > band_top {
                next_free.push(Rect::new(
                    region.left,
                    band_top,
                    band_left - region.left,
                    band_bottom - band_top,
                ));
            }
            // right of the band
            if band_right < region.right() && band_bottom > band_top {
                next_free.push(Rect::new(
                    band_right,
                    band_top,
                    region.right() - band_right,
                    band_bottom - band_top,
                ));
            }
        }
        self.free = next_free;
        self.prune_free();
    }

    /// Removes free regions fully contained in another, both directions per
    /// pair.
    fn prune_free(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut j = i + 1;
            let mut drop_i = false;
            while j < self.free.len() {
                if self.free[j].contains(&self.free[i]) {
                    drop_i = true;
                    break;
                }
                if self.free[i].contains(&self.free[j]) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if drop_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packer(width: f64, height: f64) -> Packer<&'static str> {
        Packer::new(width, height)
    }

    #[test]
    fn overlap_1d_clamps_to_zero() {
        assert_eq!(overlap_1d(0.0, 10.0, 5.0, 20.0), 5.0);
        assert_eq!(overlap_1d(0.0, 10.0, 10.0, 20.0), 0.0);
        assert_eq!(overlap_1d(0.0, 10.0, 15.0, 20.0), 0.0);
    }

    #[test]
    fn split_corner_placement_leaves_two_strips() {
        let mut p = packer(100.0, 100.0);
        p.free = vec![Rect::of_size(100.0, 100.0)];
        p.split_free(&Rect::new(0.0, 0.0, 60.0, 60.0));
        assert_eq!(
            p.free,
            vec![
                Rect::new(0.0, 60.0, 100.0, 40.0),
                Rect::new(60.0, 0.0, 40.0, 60.0),
            ]
        );
    }

    #[test]
    fn split_interior_placement_leaves_four_disjoint_strips() {
        let mut p = packer(100.0, 100.0);
        p.free = vec![Rect::of_size(100.0, 100.0)];
        p.split_free(&Rect::new(20.0, 20.0, 30.0, 30.0));
        assert_eq!(p.free.len(), 4);
        let residual: f64 = p.free.iter().map(Rect::area).sum();
        assert_eq!(residual, 100.0 * 100.0 - 30.0 * 30.0);
        for (i, a) in p.free.iter().enumerate() {
            for b in &p.free[i + 1..] {
                assert!(!a.touches(b), "{a:?} and {b:?} overlap");
            }
        }
    }

    #[test]
    fn split_leaves_edge_flush_region_intact() {
        let mut p = packer(100.0, 100.0);
        p.free = vec![Rect::new(50.0, 0.0, 50.0, 100.0)];
        // Closed-bound overlap fires on the shared edge, but every residual
        // check sees a zero-size band on that side.
        p.split_free(&Rect::new(0.0, 0.0, 50.0, 100.0));
        assert_eq!(p.free, vec![Rect::new(50.0, 0.0, 50.0, 100.0)]);
    }

    #[test]
    fn prune_drops_contained_regions() {
        let mut p = packer(100.0, 100.0);
        p.free = vec![
            Rect::new(0.0, 0.0, 40.0, 40.0),
            Rect::new(10.0, 10.0, 10.0, 10.0),
            Rect::new(50.0, 50.0, 20.0, 20.0),
            Rect::new(0.0, 0.0, 40.0, 40.0),
        ];
        p.prune_free();
        // Equal rects contain each other, so one duplicate survives.
        assert_eq!(
            p.free,
            vec![
                Rect::new(50.0, 50.0, 20.0, 20.0),
                Rect::new(0.0, 0.0, 40.0, 40.0),
            ]
        );
    }

    #[test]
    fn contact_score_counts_each_container_edge_pair_once() {
        let p = packer(100.0, 100.0);
        assert_eq!(p.contact_score(&Rect::of_size(100.0, 100.0)), 200.0);
        assert_eq!(p.contact_score(&Rect::of_size(50.0, 100.0)), 150.0);
        assert_eq!(p.contact_score(&Rect::new(20.0, 20.0, 10.0, 10.0)), 0.0);
    }

    #[test]
    fn contact_score_adds_shared_seam_intervals() {
        let mut p = packer(100.0, 100.0);
        p.placed.push(Placement {
            key: "a",
            rect: Rect::new(0.0, 0.0, 60.0, 60.0),
            rotated: false,
        });
        // right edge on the border (40) + top edge on the border (40) + seam
        // with the placed box over y in [0, 40] (40)
        let node = Rect::new(60.0, 0.0, 40.0, 40.0);
        assert_eq!(p.contact_score(&node), 120.0);
        // aligned under the placed box: left border (20) + shared seam over
        // x in [0, 30] (30)
        let node = Rect::new(0.0, 60.0, 30.0, 20.0);
        assert_eq!(p.contact_score(&node), 50.0);
    }

    #[test]
    fn best_candidate_rotates_when_only_the_swapped_orientation_fits() {
        let mut p = packer(120.0, 80.0);
        p.free = vec![Rect::new(0.0, 0.0, 120.0, 40.0)];
        // stored orientation (40 x 110) cannot fit the band at all
        let spec = BoxSpec::new(110.0, 40.0, "band");
        let candidate = p.best_candidate(&spec).unwrap();
        assert!(candidate.rotated);
        assert_eq!(candidate.rect, Rect::new(0.0, 0.0, 110.0, 40.0));
    }
}
