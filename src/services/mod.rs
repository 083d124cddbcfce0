pub mod activity;
pub mod assignment;
pub mod cloner;
pub mod dashboard;
pub mod enrollment;
pub mod notifier;
pub mod progress;
pub mod settings;
