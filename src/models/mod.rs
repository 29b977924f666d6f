pub mod announcement;
pub mod theme;
pub mod user;
