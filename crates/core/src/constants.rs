/// Constants used throughout the tollgate codebase
// Ticket id prefixes
pub const SERVICE_TICKET_PREFIX: &str = "ST";
pub const TICKET_GRANTING_TICKET_PREFIX: &str = "TGT";
pub const PROXY_GRANTING_TICKET_PREFIX: &str = "PGT";

// Environment variable names
pub const TOLLGATE_LOG_VAR: &str = "TOLLGATE_LOG";
pub const TOLLGATE_CONFIG_VAR: &str = "TOLLGATE_CONFIG";

// Default log filter when neither TOLLGATE_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info";

// Service tickets: one use, ten seconds
pub const DEFAULT_SERVICE_TICKET_MAX_USES: u32 = 1;
pub const DEFAULT_SERVICE_TICKET_TIME_TO_KILL_SECS: u64 = 10;

// Ticket-granting tickets: eight hours hard, two hours idle
pub const DEFAULT_TGT_MAX_TIME_TO_LIVE_SECS: u64 = 8 * 60 * 60;
pub const DEFAULT_TGT_TIME_TO_KILL_SECS: u64 = 2 * 60 * 60;

// Length of the random part of generated ticket ids
pub const DEFAULT_TICKET_ID_RANDOM_LENGTH: usize = 20;

// Session marker stripped from service urls before matching
pub const JSESSIONID_MARKER: &str = ";jsessionid=";
