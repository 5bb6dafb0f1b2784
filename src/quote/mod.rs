//! Quote Module
//!
//! Per-pool quoting, best-rate selection and longtail -> L1 composition.

pub mod composer;
pub mod longtail;
pub mod quoter;
pub mod selector;

pub use composer::compose_longtail_quotes;
pub use longtail::{L1QuoteSource, LongtailQuoter};
pub use quoter::{fetch_quoted_amount_out_by_pool, QuoteSimulator, RpcQuoter};
pub use selector::select_best_rate;
