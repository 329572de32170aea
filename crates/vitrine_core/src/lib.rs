//! Vitrine Core Runtime
//!
//! Foundational primitives shared by the theme engine and the effects
//! controller:
//!
//! - **Scheduler**: virtual-time timers and intervals driven by the host
//! - **Signals**: broadcast notifications with cancellable subscriptions
//! - **Debouncing**: trailing-edge, single-timer value stabilization
//! - **Store**: string key-value persistence (memory or JSON file)
//! - **Capabilities**: device and OS preference hints behind a trait
//!
//! Execution is single-threaded and cooperative: the host pushes events
//! (frames, visibility, OS preference changes) and advances the scheduler;
//! every handler completes synchronously.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use vitrine_core::{Scheduler, Signal, Visibility};
//!
//! let scheduler = Scheduler::new();
//! let visibility = Signal::<Visibility>::new();
//!
//! let _sub = visibility.subscribe(|v| println!("surface is now {:?}", v));
//! visibility.emit(&Visibility::Hidden);
//!
//! let _tick = scheduler.timeout(Duration::from_millis(300), || println!("settled"));
//! scheduler.advance_by(Duration::from_millis(300));
//! ```

pub mod capability;
pub mod clock;
pub mod color;
pub mod debounce;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod signal;
pub mod store;
pub mod subscription;
pub mod sync;

pub use capability::{
    is_mobile_user_agent, CapabilityProvider, StaticCapabilities, SystemCapabilities,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use color::Color;
pub use debounce::Debounced;
pub use error::{StoreError, StoreResult};
pub use events::{FrameTick, Visibility};
pub use scheduler::{Scheduler, TimerId};
pub use signal::{ListenerId, Signal};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use subscription::{Subscription, SubscriptionSet};
