use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::embedding::{EmbeddingSet, PointIndex};
use crate::geometry::{BBox, Point};

/// An entry in the R-tree spatial index, referencing a point by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into the embedding array.
    pub index: PointIndex,
    pub position: Point,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl PointDistance for SpatialEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.x - point[0];
        let dy = self.position.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index for viewport culling and nearest-point lookups.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load the index from an embedding set.
    pub fn build(embeddings: &EmbeddingSet) -> Self {
        let entries = embeddings
            .iter()
            .map(|(index, p)| SpatialEntry {
                index,
                position: p.position,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Indices of all points inside the viewport box, in ascending order.
    pub fn query_viewport(&self, viewport: &BBox) -> Vec<PointIndex> {
        let envelope = AABB::from_corners(
            [viewport.min.x, viewport.min.y],
            [viewport.max.x, viewport.max.y],
        );
        let mut indices: Vec<PointIndex> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|entry| entry.index)
            .collect();
        indices.sort_unstable();
        indices
    }

    /// The point closest to `point`, if any.
    pub fn nearest(&self, point: &Point) -> Option<PointIndex> {
        self.tree
            .nearest_neighbor(&[point.x, point.y])
            .map(|entry| entry.index)
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingPoint;

    fn grid() -> EmbeddingSet {
        // 5x5 grid over [-1, 1] with spacing 0.5
        let mut points = Vec::new();
        for row in 0..5 {
            for col in 0..5 {
                points.push(EmbeddingPoint::new(
                    -1.0 + col as f64 * 0.5,
                    -1.0 + row as f64 * 0.5,
                ));
            }
        }
        EmbeddingSet::new(points)
    }

    #[test]
    fn test_viewport_query() {
        let index = SpatialIndex::build(&grid());
        assert_eq!(index.len(), 25);

        let all = index.query_viewport(&BBox::around(Point::ORIGIN, 1.0));
        assert_eq!(all.len(), 25);

        // The inner 3x3 block, boundary inclusive
        let near = index.query_viewport(&BBox::around(Point::ORIGIN, 0.5));
        assert_eq!(near, vec![6, 7, 8, 11, 12, 13, 16, 17, 18]);

        let center = index.query_viewport(&BBox::around(Point::ORIGIN, 0.1));
        assert_eq!(center, vec![12]);

        let outside = index.query_viewport(&BBox::around(Point::new(5.0, 5.0), 0.5));
        assert!(outside.is_empty());
    }

    #[test]
    fn test_nearest() {
        let index = SpatialIndex::build(&grid());
        assert_eq!(index.nearest(&Point::new(0.9, 0.9)), Some(24));
        assert_eq!(SpatialIndex::new().nearest(&Point::ORIGIN), None);
    }
}
