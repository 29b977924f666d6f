pub mod announcements;
pub mod themes;
