//! Names shared between the code that stores tweets and the code that reads them back.

/// User-metadata key holding the tweet sender's username.
pub const SENDER_NAME: &str = "sendername";

/// Task queue used for per-provider store jobs.
pub const TWITTER_QUEUE: &str = "twitter";

/// Header carrying the shared secret on internal requests.
pub const INTERNAL_TOKEN_HEADER: &str = "x-tweetstore-token";

/// Query parameter naming a single provider.
pub const CONTEXT_PARAM: &str = "context";
