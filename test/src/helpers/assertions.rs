/// Assert that two motion states are equal down to the bit
#[macro_export]
macro_rules! assert_bit_identical {
    ($left:expr, $right:expr) => {
        assert!(
            $left.bit_identical(&$right),
            "States differ: {:?} vs {:?}",
            $left,
            $right
        );
    };
}

/// Assert that a viewer's client holds a proxy for a server entity
#[macro_export]
macro_rules! assert_replicated {
    ($harness:expr, $viewer:expr, $net_id:expr) => {
        assert!(
            $harness.client_replica($viewer, &$net_id).is_some(),
            "Viewer {} has no proxy for {}",
            $viewer,
            $net_id
        );
    };
}

/// Assert that the client's proxy of an entity equals the authority's state
#[macro_export]
macro_rules! assert_in_sync {
    ($harness:expr, $viewer:expr, $net_id:expr) => {
        assert_eq!(
            $harness.client_replica($viewer, &$net_id),
            $harness.server.entity(&$net_id),
            "Viewer {} is out of sync on {}",
            $viewer,
            $net_id
        );
    };
}
