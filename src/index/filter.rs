//! Bounding filters for dataset reads.

use geo::{BoundingRect, Intersects, Point, Polygon};
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

/// Region a dataset read is restricted to. Coordinates are EPSG:27700.
#[derive(Debug, Clone)]
pub enum BoundsFilter {
    /// Whole dataset. Slow and memory intensive (~1.3 million boreholes).
    None,
    Polygon(Polygon<f64>),
    /// Several polygons; a borehole matches if it falls in any of them
    Boundary(Vec<Polygon<f64>>),
}

impl BoundsFilter {
    /// Build the index used to test points, or `None` when unfiltered
    pub fn index(&self) -> Option<BoundaryIndex> {
        match self {
            BoundsFilter::None => None,
            BoundsFilter::Polygon(p) => Some(BoundaryIndex::build(vec![p.clone()])),
            BoundsFilter::Boundary(ps) => Some(BoundaryIndex::build(ps.clone())),
        }
    }
}

/// Wrapper for R-tree indexing of filter polygons
struct IndexedPolygon {
    polygon: Polygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedPolygon {
    fn new(polygon: Polygon<f64>) -> Option<Self> {
        let rect = polygon.bounding_rect()?;
        Some(Self {
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
            polygon,
        })
    }
}

/// R-tree over filter polygons
pub struct BoundaryIndex {
    tree: RTree<IndexedPolygon>,
}

impl BoundaryIndex {
    pub fn build(polygons: Vec<Polygon<f64>>) -> Self {
        let indexed: Vec<IndexedPolygon> = polygons
            .into_iter()
            .filter_map(IndexedPolygon::new)
            .collect();
        debug!("Boundary index built with {} polygons", indexed.len());

        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Whether the point lies inside or on the edge of any polygon
    pub fn matches(&self, point: &Point<f64>) -> bool {
        let query_envelope = AABB::from_point([point.x(), point.y()]);

        // Envelope candidates first, then the exact test
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .any(|ip| ip.polygon.intersects(point))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
