pub mod plan_items;
pub mod plans;
pub mod profiles;
pub mod tracking;
pub mod users;
