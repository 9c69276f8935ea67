pub mod progress;
pub mod roadmaps;
