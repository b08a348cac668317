pub mod api;
pub mod oauth1;
pub mod sso;
pub mod tokens;

pub use api::{ConnectApi, DetailSource, GarminClient, ProfileSource};
pub use sso::SsoClient;
pub use tokens::{OAuth1Token, OAuth2Token};
