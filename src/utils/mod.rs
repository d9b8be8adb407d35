pub mod osascript;
pub mod process;
pub mod subscription;
pub mod time;
