//! Boomlayout: elke dimensie apart, daarna verticaal gestapeld.

use serde::Serialize;

use crate::config::ViewConfig;
use crate::taxonomy::{NodeIdx, Taxonomy};

/// Schermpositie van een knoop: `x` volgt de diepte, `y` de volgorde van broers.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

/// Verticale spreiding van één dimensie na het stapelen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DimensionExtent {
    pub root: NodeIdx,
    pub min: f64,
    pub max: f64,
    pub offset: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    // Geïndexeerd op `NodeIdx`; de wortel heeft geen positie.
    positions: Vec<Option<NodePosition>>,
    extents: Vec<DimensionExtent>,
}

impl TreeLayout {
    #[must_use]
    pub fn compute(taxonomy: &Taxonomy, config: &ViewConfig) -> Self {
        let mut positions = vec![None; taxonomy.nodes().len()];
        let mut extents = Vec::new();
        let mut previous: Option<DimensionExtent> = None;

        for root in taxonomy.dimension_roots() {
            let mut next_slot = 0.0;
            let mut members = Vec::new();
            place_subtree(taxonomy, root, config, &mut next_slot, &mut positions, &mut members);

            let (min, max) = members
                .iter()
                .filter_map(|idx| positions[idx.0].map(|p: NodePosition| p.y))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                    (lo.min(y), hi.max(y))
                });

            let offset = match previous {
                None => -min,
                Some(prev) => prev.max - min + 2.0 * config.node_height + prev.offset,
            };
            for idx in &members {
                if let Some(position) = positions[idx.0].as_mut() {
                    position.y += offset;
                }
            }

            let extent = DimensionExtent {
                root,
                min,
                max,
                offset,
            };
            extents.push(extent);
            previous = Some(extent);
        }

        Self { positions, extents }
    }

    #[must_use]
    pub fn position(&self, idx: NodeIdx) -> Option<NodePosition> {
        self.positions.get(idx.0).copied().flatten()
    }

    #[must_use]
    pub fn extents(&self) -> &[DimensionExtent] {
        &self.extents
    }

    /// Onderkant van de gestapelde boom (0 voor een lege boom).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.extents
            .last()
            .map_or(0.0, |extent| extent.max + extent.offset)
    }

    /// Verschuif alle knopen verticaal.
    pub fn shift(&mut self, dy: f64) {
        for position in self.positions.iter_mut().flatten() {
            position.y += dy;
        }
    }
}

fn place_subtree(
    taxonomy: &Taxonomy,
    idx: NodeIdx,
    config: &ViewConfig,
    next_slot: &mut f64,
    positions: &mut [Option<NodePosition>],
    members: &mut Vec<NodeIdx>,
) -> f64 {
    let node = taxonomy.node(idx);
    let y = if node.children.is_empty() {
        let y = *next_slot * config.node_height;
        *next_slot += 1.0;
        y
    } else {
        let mut first = None;
        let mut last = 0.0;
        for child in &node.children {
            let child_y = place_subtree(taxonomy, *child, config, next_slot, positions, members);
            if first.is_none() {
                first = Some(child_y);
            }
            last = child_y;
        }
        (first.unwrap_or(last) + last) / 2.0
    };

    positions[idx.0] = Some(NodePosition {
        x: node.depth as f64 * config.node_width,
        y,
    });
    members.push(idx);
    y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy(paths: &[&[&str]]) -> Taxonomy {
        let mut taxonomy = Taxonomy::new();
        for path in paths {
            taxonomy.insert_path(*path).unwrap();
        }
        taxonomy
    }

    #[test]
    fn parents_are_centered_on_children() {
        let taxonomy = taxonomy(&[&["dim0", "A", "x"], &["dim0", "A", "y"], &["dim0", "B"]]);
        let layout = TreeLayout::compute(&taxonomy, &ViewConfig::default());
        let pos = |path: &str| layout.position(taxonomy.find(path).unwrap()).unwrap();

        assert_eq!(pos("dim0|A|x").y, 0.0);
        assert_eq!(pos("dim0|A|y").y, 30.0);
        assert_eq!(pos("dim0|B").y, 60.0);
        assert_eq!(pos("dim0|A").y, 15.0);
        assert_eq!(pos("dim0").y, 37.5);

        assert_eq!(pos("dim0").x, 80.0);
        assert_eq!(pos("dim0|A|x").x, 240.0);
        assert!(layout.position(Taxonomy::ROOT).is_none());
    }

    #[test]
    fn dimensions_are_stacked_without_overlap() {
        let taxonomy = taxonomy(&[
            &["dim0", "A"],
            &["dim0", "B"],
            &["dim1", "EU", "IE"],
            &["dim1", "EU", "GR"],
            &["dim1", "EU", "IT"],
            &["dim2", "Prominent3"],
        ]);
        let config = ViewConfig::default();
        let layout = TreeLayout::compute(&taxonomy, &config);

        let extents = layout.extents();
        assert_eq!(extents.len(), 3);

        let span = |e: &DimensionExtent| (e.min + e.offset, e.max + e.offset);
        let (d0_lo, d0_hi) = span(&extents[0]);
        let (d1_lo, d1_hi) = span(&extents[1]);
        let (d2_lo, _) = span(&extents[2]);

        assert_eq!(d0_lo, 0.0);
        assert_eq!(d1_lo - d0_hi, 2.0 * config.node_height);
        assert_eq!(d2_lo - d1_hi, 2.0 * config.node_height);
        assert_eq!(layout.bottom(), d2_lo);
    }

    #[test]
    fn empty_taxonomy_has_no_extent() {
        let layout = TreeLayout::compute(&Taxonomy::new(), &ViewConfig::default());
        assert!(layout.extents().is_empty());
        assert_eq!(layout.bottom(), 0.0);
    }
}
