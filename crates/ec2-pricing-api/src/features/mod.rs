pub mod catalog;
pub mod cost_estimation;
pub mod instance_query;
pub mod observability;
