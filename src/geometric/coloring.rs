//! Distinct fill colors for adjacent regions.
//!
//! Adjacency is detected with an R-tree over feature bounding boxes for
//! candidate pruning and an exact intersection test on the survivors.
//! Colors are then assigned greedily in layer order.

use geo::{BoundingRect, Intersects, MultiPolygon};
use log::warn;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use std::collections::HashSet;

/// Fill palette for region rendering (light qualitative colors that keep
/// dark label text readable).
pub const REGION_PALETTE: &[&str] = &[
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd",
];

type IndexedRect = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// All index pairs (i < j) of geometries that touch or overlap.
pub fn adjacency_pairs(geometries: &[MultiPolygon<f64>]) -> Vec<(usize, usize)> {
    let mut entries = Vec::with_capacity(geometries.len());
    for (index, geometry) in geometries.iter().enumerate() {
        if let Some(rect) = geometry.bounding_rect() {
            entries.push(IndexedRect::new(
                Rectangle::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                index,
            ));
        }
    }
    let tree = RTree::bulk_load(entries);

    let mut pairs = Vec::new();
    for (index, geometry) in geometries.iter().enumerate() {
        let Some(rect) = geometry.bounding_rect() else {
            continue;
        };
        let envelope = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        for candidate in tree.locate_in_envelope_intersecting(&envelope) {
            let other = candidate.data;
            if other <= index {
                continue;
            }
            if geometry.intersects(&geometries[other]) {
                pairs.push((index, other));
            }
        }
    }
    pairs
}

/// Greedy coloring: each geometry gets the first color index not already
/// used by one of its neighbors. With `n_colors` available the palette can
/// run out on dense adjacency graphs; the index then keeps growing and the
/// caller wraps it, which is logged since it may reintroduce equal colors
/// on neighbors.
pub fn color_indices(geometries: &[MultiPolygon<f64>], n_colors: usize) -> Vec<usize> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); geometries.len()];
    for (i, j) in adjacency_pairs(geometries) {
        neighbors[i].push(j);
        neighbors[j].push(i);
    }

    let mut colors: Vec<Option<usize>> = vec![None; geometries.len()];
    for index in 0..geometries.len() {
        let used: HashSet<usize> = neighbors[index]
            .iter()
            .filter_map(|&neighbor| colors[neighbor])
            .collect();
        let color = (0..).find(|c| !used.contains(c)).unwrap_or(0);
        if color >= n_colors {
            warn!(
                "palette exhausted: region {} needs color {} of {}",
                index, color, n_colors
            );
        }
        colors[index] = Some(color);
    }

    colors.into_iter().map(|c| c.unwrap_or(0)).collect()
}

/// Palette entry for a color index, wrapping past the end.
pub fn palette_color(index: usize) -> &'static str {
    REGION_PALETTE[index % REGION_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]])
    }

    #[test]
    fn test_adjacency_of_touching_squares() {
        // Row of three unit squares: 0-1 and 1-2 share an edge, 0-2 do not
        // touch.
        let geometries = vec![
            square(0.0, 0.0, 1.0),
            square(1.0, 0.0, 1.0),
            square(2.0, 0.0, 1.0),
        ];
        let mut pairs = adjacency_pairs(&geometries);
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_neighbors_get_distinct_colors() {
        let geometries = vec![
            square(0.0, 0.0, 1.0),
            square(1.0, 0.0, 1.0),
            square(0.0, 1.0, 1.0),
            square(1.0, 1.0, 1.0),
        ];
        let pairs = adjacency_pairs(&geometries);
        let colors = color_indices(&geometries, REGION_PALETTE.len());
        for (i, j) in pairs {
            assert_ne!(colors[i], colors[j], "regions {i} and {j} share a color");
        }
    }

    #[test]
    fn test_distant_regions_reuse_colors() {
        let geometries = vec![square(0.0, 0.0, 1.0), square(100.0, 0.0, 1.0)];
        let colors = color_indices(&geometries, REGION_PALETTE.len());
        assert_eq!(colors, vec![0, 0]);
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), REGION_PALETTE[0]);
        assert_eq!(palette_color(REGION_PALETTE.len()), REGION_PALETTE[0]);
    }
}
