pub mod admin;
pub mod courses;
pub mod enrollments;
pub mod progress;
pub mod users;
