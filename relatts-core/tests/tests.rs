use proptest::prelude::*;
use relatts_core::{NodeId, Position};

proptest! {
    #[test]
    fn test_position_roundtrip(p in 0..i64::MAX) {
        let pos = Position::new_valid(p);
        prop_assert_eq!(i64::from(pos), p);
        prop_assert_eq!(pos, p);
    }

    #[test]
    fn test_negative_positions_rejected(p in i64::MIN..0) {
        prop_assert!(Position::new(p).is_none());
        prop_assert!(Position::try_from(p).is_err());
    }

    #[test]
    fn test_position_ordering(a in 0..i64::MAX, b in 0..i64::MAX) {
        let pa = Position::new_valid(a);
        let pb = Position::new_valid(b);
        prop_assert_eq!(pa.cmp(&pb), a.cmp(&b));
    }

    #[test]
    fn test_node_id_roundtrip(n in 0..i32::MAX) {
        let node = NodeId::from(n);
        prop_assert!(!node.is_null());
        prop_assert_eq!(node.into_raw(), n);
        prop_assert_eq!(usize::try_from(node).unwrap(), n as usize);
    }

    #[test]
    fn test_negative_node_ids_collapse_to_null(n in i32::MIN..0) {
        let node = NodeId::from(n);
        prop_assert!(node.is_null());
        prop_assert_eq!(node, NodeId::NULL);
        prop_assert!(usize::try_from(node).is_err());
    }
}

#[test]
fn test_null_node_display() {
    assert_eq!(format!("{}", NodeId::NULL), "-1");
}
