//! Fetch pipeline for problem and contest pages.
//!
//! ### Candidate URLs
//! - Contest, problemset and gym paths, original-case label first, then lowercase.
//!
//! ### Strategy
//! - Every candidate is tried with every identity profile, sequentially.
//! - Success requires status 200 and a recognizable content marker.
//! - Misses are recorded for diagnostics, never raised.
//!
//! ### Transport
//! - `Transport` is the only network seam; `ReqwestTransport` is the
//!   production implementation (rustls, bounded redirects, body cap,
//!   per-request timeout).

pub mod candidates;
pub mod executor;
pub mod identity;
pub mod transport;

pub use candidates::{DEFAULT_ORIGIN, contest_page_candidates, generate_candidates, parse_problem_url};
pub use executor::{AttemptOutcome, Exhausted, FetchAttempt, FetchExecutor, FetchResult, has_problem_marker};
pub use identity::{IdentityProfile, default_rotation};
pub use transport::{FetchConfig, ReqwestTransport, Transport, TransportError, TransportResponse};
