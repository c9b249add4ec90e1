//! Jupiter swap-aggregator HTTP API: a thin pass-through client for
//! quoting best-price routes and building swap transactions. The
//! serialized transaction it returns feeds [`crate::Client`].

mod client;
mod types;

pub use client::{JupiterClient, DEFAULT_API_URL};
pub use types::{
    PlatformFee, PrioritizationFeeLamports, QuoteRequest, QuoteResponse, RoutePlanStep,
    SwapInfo, SwapMode, SwapRequest, SwapResponse,
};
