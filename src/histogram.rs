//! Width clustering for the rfraw encoder.
//!
//! Widths within 20 % of a cluster's running mean join that cluster; the rest
//! open a new one, up to [`MAX_HIST_BINS`]. Widths that fit nowhere once the
//! table is full are dropped.

use heapless::Vec;

use crate::consts::MAX_HIST_BINS;

/// One cluster of similar widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HistBin {
    pub(crate) count: u32,
    pub(crate) sum: u64,
    pub(crate) mean: u32,
    pub(crate) min: u32,
    pub(crate) max: u32,
}

impl HistBin {
    fn new(width: u32) -> Self {
        Self {
            count: 1,
            sum: u64::from(width),
            mean: width,
            min: width,
            max: width,
        }
    }

    fn add(&mut self, width: u32) {
        self.count += 1;
        self.sum += u64::from(width);
        self.mean = self.mean_of_sum();
        self.min = self.min.min(width);
        self.max = self.max.max(width);
    }

    fn absorb(&mut self, other: &HistBin) {
        self.count += other.count;
        self.sum += other.sum;
        self.mean = self.mean_of_sum();
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    fn mean_of_sum(&self) -> u32 {
        u32::try_from(self.sum / u64::from(self.count)).unwrap_or(u32::MAX)
    }
}

/// `|a - b| < 0.2 * max(a, b)`, in integers.
fn within_tolerance(a: u32, b: u32) -> bool {
    u64::from(a.abs_diff(b)) * 5 < u64::from(a.max(b))
}

/// An unsorted set of width clusters.
#[derive(Debug, Clone, Default)]
pub(crate) struct Histogram {
    bins: Vec<HistBin, MAX_HIST_BINS>,
}

impl Histogram {
    /// Clusters `widths`, skipping zeros, then fuses clusters whose means overlap.
    pub(crate) fn from_widths<I>(widths: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut hist = Self::default();
        for width in widths.into_iter().filter(|&w| w > 0) {
            hist.add(width);
        }
        hist.fuse();
        hist
    }

    fn add(&mut self, width: u32) {
        match self
            .bins
            .iter_mut()
            .find(|bin| within_tolerance(width, bin.mean))
        {
            Some(bin) => bin.add(width),
            None => {
                // Full table: the width is not binned.
                let _ = self.bins.push(HistBin::new(width));
            }
        }
    }

    /// Merges every pair of clusters whose means are within tolerance.
    fn fuse(&mut self) {
        let mut n = 0;
        while n + 1 < self.bins.len() {
            let mut m = n + 1;
            while m < self.bins.len() {
                if within_tolerance(self.bins[n].mean, self.bins[m].mean) {
                    let other = self.bins[m];
                    self.bins[n].absorb(&other);
                    self.bins[m..].rotate_left(1);
                    let _ = self.bins.pop();
                } else {
                    m += 1;
                }
            }
            n += 1;
        }
    }

    /// Orders clusters by ascending mean.
    pub(crate) fn sort_by_mean(&mut self) {
        self.bins.sort_unstable_by_key(|bin| bin.mean);
    }

    pub(crate) fn len(&self) -> usize {
        self.bins.len()
    }

    pub(crate) fn bins(&self) -> &[HistBin] {
        &self.bins
    }

    /// Index of the first cluster whose `[min, max]` range holds `width`.
    pub(crate) fn find(&self, width: u32) -> Option<usize> {
        self.bins
            .iter()
            .position(|bin| bin.min <= width && width <= bin.max)
    }
}
