//! Path and table constants for every external surface.
//!
//! Centralized registry so routes, clients, and tests agree on spelling.

/// Classifier backend paths (camera + detection service)
pub mod backend {
    pub const VIDEO_FEED: &str = "/video_feed";
    pub const PREDICT: &str = "/predict";
    pub const DEPOSIT: &str = "/deposit";
}

/// Routes served by this node
pub mod routes {
    pub const MANIFEST: &str = "/.well-known/farcaster.json";
    pub const HEALTH: &str = "/health";
    pub const WALLET_KIT: &str = "/api/walletkit";
}

/// Supabase tables and API prefixes
pub mod supabase {
    pub const REST: &str = "/rest/v1";
    pub const AUTH: &str = "/auth/v1";
    pub const REALTIME: &str = "/realtime/v1/websocket";

    pub const WALLETS: &str = "wallets";
    pub const ECO_TRANSACTIONS: &str = "eco_transactions";

    pub const SCHEMA: &str = "public";
}

/// Phoenix channel events used by the realtime feed
pub mod phoenix {
    pub const JOIN: &str = "phx_join";
    pub const LEAVE: &str = "phx_leave";
    pub const REPLY: &str = "phx_reply";
    pub const ERROR: &str = "phx_error";
    pub const CLOSE: &str = "phx_close";
    pub const HEARTBEAT: &str = "heartbeat";
    pub const HEARTBEAT_TOPIC: &str = "phoenix";
    pub const POSTGRES_CHANGES: &str = "postgres_changes";
}

/// Joins a base URL and a path without doubling the slash.
pub fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
