use crate::geometry::{Intersection, Primitive};
use crate::math::{Aabb, Interval, Ray};
use std::cmp::Ordering;

/// Spans at or below this size become leaves.
pub const LEAF_THRESHOLD: usize = 5;

/// Parametric gate applied to every node's slab test. The 0.01 lower bound is
/// the global continuation/shadow-ray bias that prevents self-intersection;
/// it is part of the renderer's contract, not a tunable.
const TRAVERSAL_INTERVAL: Interval<f64> = Interval::new(0.01, 1e9);

/// One node of the flattened tree. A node is a leaf iff `count > 0`, in which
/// case it covers `primitives[first .. first + count]` of the build-reordered
/// primitive array; interior nodes carry two child indices instead.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub bounds: Aabb,
    pub left: u32,
    pub right: u32,
    pub first: u32,
    pub count: u32,
}

impl Node {
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// A bounding volume hierarchy stored as a contiguous node arena.
///
/// Construction sorts the scene's primitive array in place; the tree then
/// refers to it by index only. Built once, never rebalanced.
pub struct Bvh {
    nodes: Vec<Node>,
}

impl Bvh {
    /// Top-down median-split build: each node takes the union box of its
    /// span, picks the box's longest axis, sorts the span by the primitives'
    /// box minimum along that axis, and splits in the middle. Single-threaded.
    pub fn build(primitives: &mut [Primitive]) -> Self {
        let mut nodes = Vec::with_capacity(2 * primitives.len().max(1));
        if !primitives.is_empty() {
            let end = primitives.len();
            build_node(primitives, 0, end, &mut nodes);
        }
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Closest surface hit along the ray, or `None`. Recursive descent; a
    /// node whose slab test fails prunes its whole subtree.
    pub fn intersect(&self, primitives: &[Primitive], ray: &Ray) -> Option<Intersection> {
        if self.nodes.is_empty() {
            return None;
        }
        self.intersect_node(0, primitives, ray)
    }

    fn intersect_node(
        &self,
        index: usize,
        primitives: &[Primitive],
        ray: &Ray,
    ) -> Option<Intersection> {
        let node = &self.nodes[index];
        if !node.bounds.hit(ray, TRAVERSAL_INTERVAL) {
            return None;
        }

        if node.is_leaf() {
            let begin = node.first as usize;
            let end = begin + node.count as usize;
            let mut closest: Option<Intersection> = None;
            for primitive in &primitives[begin..end] {
                if let Some(hit) = primitive.intersect(ray) {
                    if closest.map_or(true, |c| hit.t < c.t) {
                        closest = Some(hit);
                    }
                }
            }
            closest
        } else {
            let left = self.intersect_node(node.left as usize, primitives, ray);
            let right = self.intersect_node(node.right as usize, primitives, ray);
            match (left, right) {
                (Some(l), Some(r)) => Some(if l.t <= r.t { l } else { r }),
                (hit, None) | (None, hit) => hit,
            }
        }
    }
}

fn build_node(primitives: &mut [Primitive], begin: usize, end: usize, nodes: &mut Vec<Node>) -> u32 {
    let bounds = primitives[begin..end]
        .iter()
        .fold(Aabb::empty(), |acc, p| Aabb::merge(&acc, &p.bounds));

    let index = nodes.len() as u32;
    nodes.push(Node {
        bounds,
        left: 0,
        right: 0,
        first: begin as u32,
        count: 0,
    });

    let span = end - begin;
    if span <= LEAF_THRESHOLD {
        nodes[index as usize].count = span as u32;
        return index;
    }

    let axis = bounds.longest_axis();
    primitives[begin..end].sort_by(|a, b| {
        a.bounds.min[axis]
            .partial_cmp(&b.bounds.min[axis])
            .unwrap_or(Ordering::Equal)
    });

    let mid = begin + span / 2;
    let left = build_node(primitives, begin, mid, nodes);
    let right = build_node(primitives, mid, end, nodes);
    let node = &mut nodes[index as usize];
    node.left = left;
    node.right = right;
    index
}
