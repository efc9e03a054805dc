// Node layout resolution
//
// Places every node of the current snapshot on the drawing surface: an
// explicit simulation-plane position is mapped directly, anything else is
// spread on a circle around the broker.

use super::config::EngineConfig;
use super::mapper::{CoordinateMapper, PixelPoint};
use super::model::{Node, PlanePoint};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Resolve the surface position of node `index` out of `count`
///
/// Pure function of its inputs, so a node keeps its position across frames
/// as long as the snapshot and the surface stay the same.
///
/// # Arguments
/// * `node` - The node being placed
/// * `index` - Position of the node within the snapshot ordering
/// * `count` - Number of nodes in the snapshot
/// * `mapper` - Current plane-to-surface mapping
/// * `broker` - Broker position already mapped onto the surface
/// * `radius_factor` - Fallback circle radius as a fraction of min(W, H)
///
/// # Algorithm
/// Fallback angle is `(index / count) * 2π - π/2`: the first node sits at
/// twelve o'clock and the rest follow clockwise (screen y grows downward).
/// The angle follows the snapshot order, so a producer that reorders its
/// node list moves nodes around the circle.
pub fn resolve_position(
    node: &Node,
    index: usize,
    count: usize,
    mapper: &CoordinateMapper,
    broker: PixelPoint,
    radius_factor: f64,
) -> PixelPoint {
    if let Some(position) = node.position {
        return mapper.map(position);
    }

    let total = count.max(1) as f64;
    let angle = (index as f64 / total) * 2.0 * PI - PI / 2.0;
    let radius = radius_factor * mapper.min_dimension();

    PixelPoint {
        x: broker.x + radius * angle.cos(),
        y: broker.y + radius * angle.sin(),
    }
}

/// Resolved positions for one frame
///
/// Built fresh from the snapshot every frame; it carries no memory from
/// the previous frame.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    broker: PixelPoint,
    positions: Vec<PixelPoint>,
    by_id: HashMap<String, usize>,
}

impl NodeLayout {
    pub fn resolve(
        nodes: &[Node],
        broker: PlanePoint,
        mapper: &CoordinateMapper,
        config: &EngineConfig,
    ) -> Self {
        let broker = mapper.map(broker);
        let count = nodes.len();

        let mut by_id = HashMap::with_capacity(count);
        let positions = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                // Ids are unique by contract; if not, the first one wins
                by_id.entry(node.id.clone()).or_insert(index);
                resolve_position(
                    node,
                    index,
                    count,
                    mapper,
                    broker,
                    config.layout_radius_factor,
                )
            })
            .collect();

        Self {
            broker,
            positions,
            by_id,
        }
    }

    pub fn broker(&self) -> PixelPoint {
        self.broker
    }

    /// Position of the node at snapshot index `index`
    pub fn at(&self, index: usize) -> Option<PixelPoint> {
        self.positions.get(index).copied()
    }

    /// Position of the node with identifier `id`, if it is in the snapshot
    pub fn position_of(&self, id: &str) -> Option<PixelPoint> {
        self.by_id.get(id).and_then(|&idx| self.at(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
