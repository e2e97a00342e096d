use burst_charts::prelude::{HierarchyNode, Partition, PositionedNode, WeightMode};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

fn hierarchy() -> impl Strategy<Value = HierarchyNode> {
    let leaf = (0.0f64..100.0).prop_map(|size| HierarchyNode::leaf("leaf", size));
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop::collection::vec(inner, 1..5).prop_map(|children| HierarchyNode::branch("branch", children))
    })
}

fn mode() -> impl Strategy<Value = WeightMode> {
    prop_oneof![Just(WeightMode::Count), Just(WeightMode::Size)]
}

proptest! {
    #[test]
    fn children_tile_their_parent(root in hierarchy(), mode in mode()) {
        let partition = Partition::layout(&root, mode);
        for parent in partition.nodes() {
            let children: Vec<&PositionedNode> = parent
                .children
                .iter()
                .filter_map(|id| partition.get(*id))
                .collect();
            let Some(first) = children.first() else { continue };
            prop_assert!((first.angle_start - parent.angle_start).abs() < EPS);

            let total: f64 = children.iter().map(|c| c.angle_span).sum();
            if parent.value > 0.0 {
                prop_assert!((total - parent.angle_span).abs() < EPS, "{total} vs {}", parent.angle_span);
            } else {
                prop_assert!(total.abs() < EPS);
            }

            for child in children {
                prop_assert!(child.depth_start >= parent.depth_end() - EPS);
                prop_assert!(child.depth_start > parent.depth_start);
                prop_assert_eq!(child.parent, Some(parent.id));
            }
        }
    }

    #[test]
    fn layout_stays_inside_the_unit_square(root in hierarchy(), mode in mode()) {
        let partition = Partition::layout(&root, mode);
        let root = &partition.nodes()[0];
        prop_assert_eq!(root.angle_start, 0.0);
        prop_assert_eq!(root.angle_span, 1.0);
        for node in partition.nodes() {
            prop_assert!(node.angle_start >= -EPS && node.angle_end() <= 1.0 + EPS);
            prop_assert!(node.depth_start >= 0.0 && node.depth_end() <= 1.0 + EPS);
        }
    }
}
