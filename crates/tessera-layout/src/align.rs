//! Group alignment for `Pos::align`.
//!
//! Sibling views that share an align group are packed along one axis as a
//! single run, the way a stack layout distributes its items.

use std::fmt;

/// Where a packed run sits inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// Pack items at the start
    #[default]
    Start,
    /// Center the packed run
    Center,
    /// Pack items against the end
    End,
    /// Spread leftover space between items
    Fill,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alignment::Start => "Start",
            Alignment::Center => "Center",
            Alignment::End => "End",
            Alignment::Fill => "Fill",
        };
        f.write_str(name)
    }
}

/// Alignment settings shared by the members of an align group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Aligner {
    pub alignment: Alignment,
    /// Leave one empty cell between neighbouring items
    pub add_space_between: bool,
}

impl Aligner {
    pub fn new(alignment: Alignment) -> Self {
        Self {
            alignment,
            add_space_between: false,
        }
    }

    /// Set whether items are separated by a cell.
    pub fn with_space_between(mut self, add_space_between: bool) -> Self {
        self.add_space_between = add_space_between;
        self
    }

    /// Compute the start of every item in a container of `container` cells.
    ///
    /// Positions may be negative when the run is larger than the container.
    pub fn align(&self, sizes: &[i32], container: i32) -> Vec<i32> {
        if sizes.is_empty() {
            return Vec::new();
        }
        if self.alignment == Alignment::Fill {
            return self.justify(sizes, container);
        }

        let gap = self.gap();
        let total = packed_extent(sizes, gap);
        let mut offset = match self.alignment {
            Alignment::Start | Alignment::Fill => 0,
            Alignment::End => container - total,
            Alignment::Center => (container - total) / 2,
        };

        sizes
            .iter()
            .map(|&size| {
                let start = offset;
                offset += size + gap;
                start
            })
            .collect()
    }

    fn justify(&self, sizes: &[i32], container: i32) -> Vec<i32> {
        if sizes.len() == 1 {
            return vec![0];
        }

        let gaps = i32::try_from(sizes.len() - 1).unwrap_or(i32::MAX);
        let used: i32 = sizes.iter().sum();
        let extra = (container - used).max(0);
        let base = extra / gaps;
        let remainder = extra % gaps;

        let mut offset = 0;
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let start = offset;
                let mut gap = base + i32::from(i32::try_from(i).is_ok_and(|i| i < remainder));
                if self.add_space_between {
                    gap = gap.max(1);
                }
                offset += size + gap;
                start
            })
            .collect()
    }

    fn gap(&self) -> i32 {
        i32::from(self.add_space_between)
    }
}

/// Total extent of items packed with `gap` cells between neighbours.
fn packed_extent(sizes: &[i32], gap: i32) -> i32 {
    let items: i32 = sizes.iter().sum();
    let gaps = i32::try_from(sizes.len().saturating_sub(1)).unwrap_or(i32::MAX);
    items.saturating_add(gap.saturating_mul(gaps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_packs_from_zero() {
        let aligner = Aligner::new(Alignment::Start);
        assert_eq!(aligner.align(&[3, 4, 2], 20), vec![0, 3, 7]);
    }

    #[test]
    fn test_space_between() {
        let aligner = Aligner::new(Alignment::Start).with_space_between(true);
        assert_eq!(aligner.align(&[3, 4, 2], 20), vec![0, 4, 9]);
    }

    #[test]
    fn test_end_packs_against_container_end() {
        let aligner = Aligner::new(Alignment::End);
        assert_eq!(aligner.align(&[3, 4], 10), vec![3, 6]);
        assert_eq!(aligner.align(&[8, 4], 10), vec![-2, 6]);
    }

    #[test]
    fn test_center_truncates() {
        let aligner = Aligner::new(Alignment::Center);
        assert_eq!(aligner.align(&[3], 10), vec![3]);
        assert_eq!(aligner.align(&[2, 2], 9), vec![2, 4]);
    }

    #[test]
    fn test_fill_gives_remainder_to_earliest_gaps() {
        let aligner = Aligner::new(Alignment::Fill);
        // 20 - 9 = 11 spare cells over 2 gaps: 6 then 5
        assert_eq!(aligner.align(&[3, 4, 2], 20), vec![0, 9, 18]);
        assert_eq!(aligner.align(&[5], 20), vec![0]);
    }

    #[test]
    fn test_fill_overflow_packs() {
        let aligner = Aligner::new(Alignment::Fill);
        assert_eq!(aligner.align(&[6, 6], 10), vec![0, 6]);
        let spaced = aligner.with_space_between(true);
        assert_eq!(spaced.align(&[6, 6], 10), vec![0, 7]);
    }

    #[test]
    fn test_empty_group() {
        assert!(Aligner::default().align(&[], 10).is_empty());
    }
}
