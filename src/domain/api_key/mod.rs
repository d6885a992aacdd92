//! API key bounded context: hashed credentials and their validation.

mod key;
mod secret;

pub use key::{
    ApiKey, ApiKeyPermission, ApiKeyPermissions, ApiKeyRejection, ApiKeyValidation,
};
pub use secret::{generate_api_key, hash_api_key, API_KEY_PREFIX};
