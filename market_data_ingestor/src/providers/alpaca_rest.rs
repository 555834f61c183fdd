//! Alpaca market data REST provider.
//!
//! Crypto bars come from the public `v1beta3/crypto/us` endpoint and need no
//! credentials; equity bars use `v2/stocks` with the `APCA_*` key pair.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::AlpacaProvider;
