//! External collaborators: streaming service search and the profile store

pub mod music_api;
pub mod profile_store;

pub use music_api::{MusicApiClient, MusicApiError, ScopedSearch, SearchScope, SongSearch};
pub use profile_store::{LinkedAccount, MemoryProfileStore, ProfileStore, UserProfile};
