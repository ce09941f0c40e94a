//! Platform services for tweetstore.
//!
//! The application schedules its own work: a [`Cron`] ticks the enqueue
//! endpoint, and an [`HttpTaskQueue`] delivers queued tasks back to the
//! application over HTTP. Both authenticate with the internal token.

mod client;
mod cron;
mod error;
mod queue;
mod services;

#[cfg(test)]
mod testing;

pub use client::InternalClient;
pub use cron::{CRON_PATH, Cron};
pub use error::QueueError;
pub use queue::{HttpTaskQueue, QUEUE_CAPACITY, Task, TaskMethod, TaskQueue};
pub use services::PlatformServices;
