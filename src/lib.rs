pub mod config;
pub mod edit;
pub mod error;
pub mod formats;
pub mod id;
pub mod model;
pub mod viewport;
pub mod zoom;

pub use edit::{DragOrigin, DragSession, Handle};
pub use error::TimingError;
pub use id::{IdGenerator, SequentialIdGen, UuidIdGen};
pub use model::{Sentence, Timeline, Violation, Word};
pub use viewport::{
    PlaybackTick, RowGeometry, RowLayout, ScrollBehavior, ScrollCommand, ViewportSync,
};
pub use zoom::Zoom;
