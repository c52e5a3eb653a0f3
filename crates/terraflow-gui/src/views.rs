pub mod bar;
pub mod clock;
pub mod dashboard;
pub mod workspaces;
