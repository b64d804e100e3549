pub mod grouping;
pub mod identity;
pub mod pipeline;
pub mod shared;
