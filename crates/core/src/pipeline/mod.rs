pub mod cluster_config;
pub mod cluster_error;
pub mod cluster_events_use_case;
pub mod cluster_result;
pub mod pipeline_logger;
