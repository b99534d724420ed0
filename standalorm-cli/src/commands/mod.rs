//! Command implementations for the standalorm CLI

pub mod about;
pub mod app;
pub mod db;
pub mod settings;

pub use about::run_about;
pub use app::{run_manage, run_pycharm, run_startapp};
pub use db::run_db;
pub use settings::run_settings;
