//! The in-memory story collection.
//!
//! Expiry is enforced twice: every read filters on `expires_at`, and a background
//! sweep physically drops expired stories once per interval so memory stays bounded.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
    clock::Clock,
    persistence::StoryPersistence,
    story::{format_remaining, NewStory, Story, StoryStats, EXPIRED},
};

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            sweep_interval: SWEEP_INTERVAL,
        }
    }
}

type Listener = Arc<dyn Fn(&[Story]) + Send + Sync>;

#[derive(Default)]
struct State {
    stories: Vec<Story>,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

impl State {
    fn active(&self, now: i64) -> Vec<Story> {
        self.stories
            .iter()
            .filter(|story| story.is_active_at(now))
            .cloned()
            .collect()
    }
}

struct Shared {
    state: Mutex<State>,
    persistence: Arc<dyn StoryPersistence>,
    clock: Arc<dyn Clock>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called with the state lock held so saves land in mutation order.
    fn persist(&self, stories: &[Story]) {
        if let Err(e) = self.persistence.save(stories) {
            tracing::warn!(error = %e, "failed to save stories");
        }
    }

    /// Listeners run without the lock held, so they may call back into the store.
    ///
    /// The active list is read again for every listener, so one that mutates the
    /// store cannot leave the listeners after it holding an older list. Listeners
    /// unsubscribed during delivery are skipped.
    fn notify(&self) {
        let ids: Vec<u64> = self.lock().listeners.iter().map(|(id, _)| *id).collect();
        for id in ids {
            let now = self.clock.now_millis();
            let delivery = {
                let state = self.lock();
                let found = state
                    .listeners
                    .iter()
                    .find(|(listener_id, _)| *listener_id == id)
                    .map(|(_, listener)| (listener.clone(), state.active(now)));
                found
            };
            if let Some((listener, active)) = delivery {
                listener(&active);
            }
        }
    }

    fn sweep_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let removed = {
            let mut state = self.lock();
            let before = state.stories.len();
            state.stories.retain(|story| story.is_active_at(now));
            let removed = before - state.stories.len();
            if removed == 0 {
                return 0;
            }
            tracing::info!(removed, remaining = state.stories.len(), "swept expired stories");
            self.persist(&state.stories);
            removed
        };
        self.notify();
        removed
    }
}

/// Aborts the sweep task once the last store handle is gone.
struct Sweeper(Mutex<Option<JoinHandle<()>>>);

impl Sweeper {
    fn stop(&self) {
        if let Some(handle) = self.0.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_sweeper(shared: Weak<Shared>, period: Duration) -> JoinHandle<()> {
    let first_tick = Instant::now() + period;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            shared.sweep_expired();
        }
    })
}

/// Owns every story and hands out copies.
///
/// Handles are cheap to clone and share one collection. Construction spawns the
/// sweep task, so it must happen inside a tokio runtime.
#[derive(Clone)]
pub struct StoryStore {
    shared: Arc<Shared>,
    sweeper: Arc<Sweeper>,
}

impl StoryStore {
    pub fn new(persistence: Arc<dyn StoryPersistence>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(StoreConfig::default(), persistence, clock)
    }

    pub fn with_config(
        config: StoreConfig,
        persistence: Arc<dyn StoryPersistence>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let stories = match persistence.load() {
            Ok(stories) => stories,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load stories, starting empty");
                Vec::new()
            }
        };
        tracing::info!(
            loaded = stories.len(),
            sweep_interval_secs = config.sweep_interval.as_secs(),
            "story store started"
        );

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                stories,
                ..Default::default()
            }),
            persistence,
            clock,
        });
        let handle = spawn_sweeper(Arc::downgrade(&shared), config.sweep_interval);
        StoryStore {
            shared,
            sweeper: Arc::new(Sweeper(Mutex::new(Some(handle)))),
        }
    }

    fn now(&self) -> i64 {
        self.shared.clock.now_millis()
    }

    pub fn add_story(&self, input: NewStory) -> Story {
        let now = self.now();
        let story = Story::create(input, now);
        {
            let mut state = self.shared.lock();
            state.stories.push(story.clone());
            self.shared.persist(&state.stories);
        }
        tracing::info!(story_id = %story.id, user_id = %story.user_id, kind = ?story.kind, "story added");
        self.shared.notify();
        story
    }

    /// Live stories in creation order.
    pub fn active_stories(&self) -> Vec<Story> {
        let now = self.now();
        self.shared.lock().active(now)
    }

    pub fn user_stories(&self, user_id: &str) -> Vec<Story> {
        let now = self.now();
        self.shared
            .lock()
            .stories
            .iter()
            .filter(|story| story.user_id == user_id && story.is_active_at(now))
            .cloned()
            .collect()
    }

    pub fn story(&self, story_id: Uuid) -> Option<Story> {
        let now = self.now();
        self.shared
            .lock()
            .stories
            .iter()
            .find(|story| story.id == story_id && story.is_active_at(now))
            .cloned()
    }

    /// Records a view. Unknown and expired stories are ignored. Subscribers are not notified.
    pub fn view_story(&self, story_id: Uuid, viewer_id: &str) {
        let now = self.now();
        {
            let mut state = self.shared.lock();
            let Some(story) = state
                .stories
                .iter_mut()
                .find(|story| story.id == story_id && story.is_active_at(now))
            else {
                return;
            };
            if !story.add_viewer(viewer_id) {
                return;
            }
            self.shared.persist(&state.stories);
        }
        tracing::debug!(story_id = %story_id, viewer_id, "story viewed");
    }

    pub fn delete_story(&self, story_id: Uuid) -> bool {
        {
            let mut state = self.shared.lock();
            let Some(index) = state.stories.iter().position(|story| story.id == story_id) else {
                return false;
            };
            state.stories.remove(index);
            self.shared.persist(&state.stories);
        }
        tracing::info!(story_id = %story_id, "story deleted");
        self.shared.notify();
        true
    }

    pub fn time_until_expiration(&self, story_id: Uuid) -> String {
        match self.story(story_id) {
            Some(story) => format_remaining(story.expires_at - self.now()),
            None => EXPIRED.to_string(),
        }
    }

    /// True for expired stories and for ids the store has never seen.
    pub fn is_story_expired(&self, story_id: Uuid) -> bool {
        self.story(story_id).is_none()
    }

    /// Registers `listener` to receive the active stories after every add, delete or sweep removal.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[Story]) + Send + Sync + 'static,
    {
        let mut state = self.shared.lock();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.push((id, Arc::new(listener)));
        Subscription {
            shared: Arc::downgrade(&self.shared),
            id,
        }
    }

    /// Counts cover every resident story of the user, including expired ones not yet swept.
    pub fn story_stats(&self, user_id: &str) -> StoryStats {
        let now = self.now();
        self.shared
            .lock()
            .stories
            .iter()
            .filter(|story| story.user_id == user_id)
            .fold(StoryStats::default(), |mut stats, story| {
                stats.total_views += story.viewers.len();
                stats.total_stories += 1;
                if story.is_active_at(now) {
                    stats.active_stories += 1;
                }
                stats
            })
    }

    /// Runs one sweep now and returns how many stories were removed.
    pub fn sweep_expired(&self) -> usize {
        self.shared.sweep_expired()
    }

    /// Resident stories, including expired ones awaiting the sweep.
    pub fn len(&self) -> usize {
        self.shared.lock().stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops the sweep timer. Reads and writes keep working.
    pub fn shutdown(&self) {
        self.sweeper.stop();
    }
}

/// Handle returned by [`StoryStore::subscribe`].
pub struct Subscription {
    shared: Weak<Shared>,
    id: u64,
}

impl Subscription {
    /// Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
