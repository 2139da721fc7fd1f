//! Constants for the FEY dashboard.
//!
//! Contract addresses, upstream endpoints, cache keys and the heuristic
//! thresholds used by the launchpad prober. The thresholds are tuning values,
//! not protocol facts; only their relative ordering matters.

// ═══════════════════════════════════════════════════════════════════════════════
// CONTRACTS (Base mainnet)
// ═══════════════════════════════════════════════════════════════════════════════

/// xFEY vault contract queried for the xFEY → FEY conversion.
pub const XFEY_CONTRACT_ADDRESS: &str = "0x72f5565ab147105614ca4eb83ecf15f751fd8c50";

/// Launchpad factory whose deployed-token count is probed.
pub const LAUNCHPAD_ADDRESS: &str = "0x8EEF0dC80ADf57908bB1be0236c2a72a7e379C2d";

/// xFEY amount (in base units) used when sampling the conversion rate.
pub const SAMPLE_XFEY_AMOUNT: u64 = 1_000_000;

/// ERC-4626 `previewRedeem(uint256)` signature.
pub const PREVIEW_REDEEM_SIGNATURE: &str = "previewRedeem(uint256)";

/// Uniswap v4 pool id tracked on the subgraph.
pub const FEY_POOL_ID: &str = "0xe155c517c53f078f4b443c99436e42c1b80fd2fb1b3508f431c46b8365e4f3f0";

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Public Base RPC used for the conversion sample.
pub const DEFAULT_BASE_RPC_URL: &str = "https://mainnet.base.org";

/// Alchemy Base endpoint; the API key is appended as a path segment.
pub const DEFAULT_ALCHEMY_BASE_URL: &str = "https://base-mainnet.g.alchemy.com/v2";

/// Dune API root.
pub const DEFAULT_DUNE_BASE_URL: &str = "https://api.dune.com/api/v1";

/// Dune query computing the total FEY awarded.
pub const DEFAULT_DUNE_QUERY_ID: u64 = 6_177_560;

/// Row limit requested from Dune.
pub const DUNE_RESULT_LIMIT: u32 = 1000;

/// The Graph gateway URL for the pool subgraph.
pub const DEFAULT_SUBGRAPH_URL: &str =
    "https://gateway.thegraph.com/api/subgraphs/id/Gqm2b5J85n1bhCyDMpGbtbVn4935EvvdyHdHrx3dibyj";

/// Basescan API root.
pub const DEFAULT_EXPLORER_BASE_URL: &str = "https://api.basescan.org/api";

/// Public placeholder key accepted by Basescan at a reduced rate limit.
pub const EXPLORER_PLACEHOLDER_API_KEY: &str = "YourApiKeyToken";

/// Default timeout applied to every external call.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE KEYS & TTLS
// ═══════════════════════════════════════════════════════════════════════════════

/// Cache key for the Dune "total FEY awarded" figure.
pub const DUNE_CACHE_KEY: &str = "dune_fey_awarded_v4";

/// TTL for the Dune figure (30 minutes).
pub const DUNE_CACHE_TTL_SECONDS: u64 = 1800;

/// Cache key for the launchpad token count.
pub const LAUNCHPAD_CACHE_KEY: &str = "launchpad_token_count_v3";

/// TTL for the launchpad token count (2 minutes).
pub const LAUNCHPAD_CACHE_TTL_SECONDS: u64 = 120;

/// Cache key for the subgraph pool statistics.
pub const VOLUME_CACHE_KEY: &str = "thegraph_dex_volume";

/// TTL for the pool statistics (30 minutes).
pub const VOLUME_CACHE_TTL_SECONDS: u64 = 1800;

/// Default number of history rows returned.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

// ═══════════════════════════════════════════════════════════════════════════════
// PROBE THRESHOLDS
// ═══════════════════════════════════════════════════════════════════════════════
// Ordered from most to least authoritative. Each window is exclusive on both ends.

/// Candidate zero-argument accessors, tried in this order.
pub const LAUNCHPAD_COUNT_FUNCTIONS: &[&str] = &[
    "tokenCount",
    "totalTokens",
    "getTokenCount",
    "numberOfTokens",
    "deployedTokensLength",
    "getAllTokensLength",
    "tokensLength",
    "count",
    "length",
];

/// Lower bound for a direct accessor result.
pub const SELECTOR_COUNT_MIN: u64 = 0;

/// Upper bound for a direct accessor result.
pub const SELECTOR_COUNT_MAX: u64 = 1_000_000;

/// Number of low storage slots scanned (slots `0..STORAGE_SLOT_SCAN_LIMIT`).
pub const STORAGE_SLOT_SCAN_LIMIT: u64 = 20;

/// Lower bound for a storage-slot counter; excludes flags and reentrancy guards.
pub const STORAGE_SLOT_COUNT_MIN: u64 = 1;

/// Upper bound for a storage-slot counter; excludes addresses, hashes, timestamps.
pub const STORAGE_SLOT_COUNT_MAX: u64 = 50_000;

/// Lower bound for explorer-derived proxy counts.
pub const EXPLORER_COUNT_MIN: u64 = 0;

/// Upper bound for explorer-derived proxy counts.
pub const EXPLORER_COUNT_MAX: u64 = 10_000_000;

/// Source tag reported when every probe failed.
pub const PROBE_SOURCE_NONE: &str = "none";
