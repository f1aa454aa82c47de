//! Ephemeral stories: time-bounded records that vanish 24 hours after creation.

pub mod clock;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod persistence;
pub mod reply;
pub mod store;
pub mod story;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PersistenceError, UnknownKind};
pub use persistence::{MemoryPersistence, NullPersistence, StoryPersistence};
pub use store::{StoreConfig, StoryStore, Subscription, SWEEP_INTERVAL};
pub use story::{
    format_relative_time, format_remaining, has_user_viewed, NewStory, Story, StoryKind,
    StoryMedia, StoryStats, EXPIRED, STORY_TTL_MILLIS,
};
