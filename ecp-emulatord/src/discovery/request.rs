use std::time::Duration;
use rand::Rng;
use shared::protocol::{ECP_SEARCH_TARGET, MSEARCH_METHOD, SSDP_ALL, SSDP_MAX_DELAY};

/// MX header as found in a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mx {
    Given(u64),
    /// Header absent, empty, negative or non-numeric
    Fallback,
}

impl Mx {
    /// Any run of ASCII digits is accepted regardless of length; values too
    /// large for `u64` saturate. Everything else falls back.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim) else {
            return Mx::Fallback;
        };

        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Mx::Fallback;
        }

        Mx::Given(value.parse::<u64>().unwrap_or(u64::MAX))
    }

    /// Reply window in seconds, capped at [`SSDP_MAX_DELAY`]
    pub fn effective_secs(&self) -> u64 {
        match self {
            Mx::Given(mx) => (*mx).min(SSDP_MAX_DELAY),
            Mx::Fallback => SSDP_MAX_DELAY,
        }
    }

    /// Uniformly distributed delay in `[0, effective_secs]`
    pub fn reply_delay(&self) -> Duration {
        let window_ms = self.effective_secs() * 1000;
        Duration::from_millis(rand::rng().random_range(0..=window_ms))
    }
}

/// A parsed SSDP search. Header names are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub method: String,
    pub target: String,
    pub mx: Mx,
}

impl SearchRequest {
    /// Returns `None` for anything that is not a well-formed request line
    /// with a search target header.
    pub fn parse(data: &str) -> Option<Self> {
        let mut lines = data.lines();
        let request_line = lines.next()?;

        let mut parts = request_line.split_whitespace();
        let method = parts.next()?;
        let uri = parts.next()?;
        let version = parts.next()?;
        if !version.starts_with("HTTP/") || parts.next().is_some() {
            return None;
        }
        if method == MSEARCH_METHOD && uri != "*" {
            return None;
        }

        let mut target = None;
        let mut mx = None;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.eq_ignore_ascii_case("ST") {
                target = Some(value.trim());
            } else if name.eq_ignore_ascii_case("MX") {
                mx = Some(value);
            }
        }

        Some(Self {
            method: method.to_string(),
            target: target?.to_string(),
            mx: Mx::parse(mx),
        })
    }

    /// True for an M-SEARCH aimed at this device type or at every device
    pub fn is_ecp_search(&self) -> bool {
        self.method == MSEARCH_METHOD
            && (self.target == ECP_SEARCH_TARGET || self.target == SSDP_ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msearch(headers: &str) -> String {
        format!(
            "M-SEARCH * HTTP/1.1\r\nHOST: 239.255.255.250:1900\r\nMAN: \"ssdp:discover\"\r\n{}\r\n",
            headers
        )
    }

    #[test]
    fn test_parse_ecp_search() {
        let req = SearchRequest::parse(&msearch("MX: 3\r\nST: roku:ecp\r\n")).unwrap();
        assert_eq!(req.method, "M-SEARCH");
        assert_eq!(req.target, "roku:ecp");
        assert_eq!(req.mx, Mx::Given(3));
        assert!(req.is_ecp_search());
    }

    #[test]
    fn test_parse_ssdp_all_lowercase_headers() {
        let req = SearchRequest::parse(&msearch("mx: 2\r\nst: ssdp:all\r\n")).unwrap();
        assert_eq!(req.mx, Mx::Given(2));
        assert!(req.is_ecp_search());
    }

    #[test]
    fn test_parse_accepts_bare_newlines() {
        let req = SearchRequest::parse("M-SEARCH * HTTP/1.1\nST: roku:ecp\nMX: 1\n").unwrap();
        assert!(req.is_ecp_search());
        assert_eq!(req.mx, Mx::Given(1));
    }

    #[test]
    fn test_other_targets_are_not_ecp() {
        let req = SearchRequest::parse(&msearch("MX: 3\r\nST: upnp:rootdevice\r\n")).unwrap();
        assert!(!req.is_ecp_search());
    }

    #[test]
    fn test_non_search_methods_are_not_ecp() {
        let notify = "NOTIFY * HTTP/1.1\r\nNT: roku:ecp\r\nST: roku:ecp\r\n\r\n";
        assert!(!SearchRequest::parse(notify).unwrap().is_ecp_search());
    }

    #[test]
    fn test_malformed_datagrams_are_discarded() {
        assert!(SearchRequest::parse("").is_none());
        assert!(SearchRequest::parse("M-SEARCH").is_none());
        assert!(SearchRequest::parse("M-SEARCH *").is_none());
        assert!(SearchRequest::parse("HTTP/1.1 200 OK\r\nSomething\r\n\r\n").is_none());
        assert!(SearchRequest::parse("M-SEARCH /path HTTP/1.1\r\nST: roku:ecp\r\n").is_none());
        assert!(SearchRequest::parse("M-SEARCH * HTTP/1.1\r\nMX: 3\r\n\r\n").is_none());
    }

    #[test]
    fn test_missing_and_malformed_mx_fall_back() {
        assert_eq!(Mx::parse(None), Mx::Fallback);
        assert_eq!(Mx::parse(Some("")), Mx::Fallback);
        assert_eq!(Mx::parse(Some(" x")), Mx::Fallback);
        assert_eq!(Mx::parse(Some("-1")), Mx::Fallback);
        assert_eq!(Mx::parse(Some("+3")), Mx::Fallback);
        assert_eq!(Mx::parse(Some("2.5")), Mx::Fallback);
        assert_eq!(Mx::parse(Some("3 4")), Mx::Fallback);

        let req = SearchRequest::parse(&msearch("MX: x\r\nST: roku:ecp\r\n")).unwrap();
        assert_eq!(req.mx, Mx::Fallback);
        let req = SearchRequest::parse(&msearch("ST: roku:ecp\r\n")).unwrap();
        assert_eq!(req.mx, Mx::Fallback);
    }

    #[test]
    fn test_multi_digit_mx_is_accepted() {
        assert_eq!(Mx::parse(Some(" 10 ")), Mx::Given(10));
        assert_eq!(Mx::parse(Some("120")), Mx::Given(120));
        assert_eq!(Mx::parse(Some("007")), Mx::Given(7));
        assert_eq!(
            Mx::parse(Some("123456789012345678901234567890")),
            Mx::Given(u64::MAX)
        );
    }

    #[test]
    fn test_effective_window_is_capped() {
        assert_eq!(Mx::Given(0).effective_secs(), 0);
        assert_eq!(Mx::Given(3).effective_secs(), 3);
        assert_eq!(Mx::Given(120).effective_secs(), SSDP_MAX_DELAY);
        assert_eq!(Mx::Given(u64::MAX).effective_secs(), SSDP_MAX_DELAY);
        assert_eq!(Mx::Fallback.effective_secs(), SSDP_MAX_DELAY);
    }

    #[test]
    fn test_reply_delay_within_window() {
        for mx in 0..=200u64 {
            let mx = Mx::Given(mx);
            for _ in 0..5 {
                assert!(mx.reply_delay() <= Duration::from_secs(mx.effective_secs()));
            }
        }
        for _ in 0..100 {
            assert!(Mx::Fallback.reply_delay() <= Duration::from_secs(SSDP_MAX_DELAY));
        }
        assert_eq!(Mx::Given(0).reply_delay(), Duration::ZERO);
    }
}
