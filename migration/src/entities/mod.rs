pub mod short_link;
pub mod user;
pub mod visit_record;
