//! Pacing engine for one-word-at-a-time speed reading.
//!
//! The crate is organised leaves-first:
//! - `navigation`: pure index arithmetic (skips, paragraph lookups).
//! - `pacing`: timing configuration, word modifiers and ramp interpolation.
//! - `scheduler`: the accumulator-driven playback loop.
//! - `state_machine`: reader states and transition notifications.
//! - `session`: composes the above into the host-facing reader controller.
//!
//! Text extraction (`tokenizer`) and progress records (`progress`) sit at the
//! collaborator boundary and carry no rendering or storage of their own.

pub mod navigation;
pub mod observer;
pub mod pacing;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod state_machine;
pub mod timer;
pub mod tokenizer;
pub mod word;

pub use observer::{Listeners, Subscription};
pub use pacing::TimingConfig;
pub use progress::{KeyValueStore, MemoryStore, ProgressBook, ProgressEntry};
pub use scheduler::{PlaybackEvent, PlaybackObserver, PlaybackScheduler, TickOutcome};
pub use session::{ReaderSession, SessionCommand, SessionOptions, SessionSnapshot};
pub use state_machine::{ReaderState, StateChange, StateMachine};
pub use timer::{FrameToken, HostTimer, ManualTimer};
pub use word::{Extraction, ParagraphBoundaries, SourceAnchor, WordRecord};
