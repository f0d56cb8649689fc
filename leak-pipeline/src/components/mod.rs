pub mod run_log_side_effect;
pub mod top_leaks_selector;
