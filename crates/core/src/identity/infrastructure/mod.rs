pub mod dbscan_identity_resolver;
pub mod greedy_anchor_resolver;
