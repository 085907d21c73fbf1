/// SSDP multicast group the discovery responder joins
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250";

/// Well-known SSDP port
pub const SSDP_PORT: u16 = 1900;

/// Request line of a discovery search
pub const MSEARCH_METHOD: &str = "M-SEARCH";

/// Search target advertised by the emulated device
pub const ECP_SEARCH_TARGET: &str = "roku:ecp";

/// Wildcard search target matching every device
pub const SSDP_ALL: &str = "ssdp:all";

/// Upper bound on the MX reply window, in seconds. Also the fallback when a
/// search carries no usable MX header.
pub const SSDP_MAX_DELAY: u64 = 5;

/// Cache-Control max-age advertised in replies and NOTIFY messages
pub const MAX_AGE: u32 = 300;

/// Default ECP control port
pub const ECP_PORT: u16 = 8060;

/// Version tag attached to every listed application
pub const APP_VERSION: &str = "1.0.0";
