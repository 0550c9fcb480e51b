pub mod board;
pub mod level_summary;
pub mod progress_bar;
pub mod setup_menu;
