mod auth;
mod storage;

pub use auth::AUTH_STORAGE_KEY;
pub use auth::PKCE_VERIFIER_FALLBACK_KEY;
pub use auth::PKCE_VERIFIER_KEY;
pub use auth::TokenStore;
pub use storage::FileStorage;
pub use storage::MemoryStorage;
pub use storage::Storage;
