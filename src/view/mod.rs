//! View models for the feed screens.
//!
//! These hold no I/O. A client feeds them service results (or HTTP
//! responses) and user input, and renders whatever state they report.

pub mod card;
pub mod feed;
pub mod form;
pub mod layout;
pub mod stories;

pub use card::PostCard;
pub use feed::{FeedList, FeedScreen, Scroll};
pub use form::{CreatePostForm, Field};
pub use layout::{AuthState, MainLayout, MainScreen, Tab};
pub use stories::{StoriesRail, StoryCard};
