pub mod event_group;
pub mod event_grouper;
pub mod extras_resolver;
