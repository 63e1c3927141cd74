pub mod grade;
pub mod results;
pub mod status;
pub mod validate;
