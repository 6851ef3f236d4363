pub mod entities;
pub mod repository;

pub use entities::{
    AnimeLoadTask, NewAnimeLoadTask, ResolutionMethod, TaskStats, TaskStatus, DEFAULT_MAX_ATTEMPTS,
};
pub use repository::TaskRepository;
