pub mod change_mask;
pub mod diff_mask;
pub mod dirty_channel;
pub mod global_diff_handler;
