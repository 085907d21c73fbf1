use shared::protocol::{ECP_SEARCH_TARGET, MAX_AGE, SSDP_MULTICAST_ADDR, SSDP_PORT};
use crate::device::DeviceIdentity;

const SERVER: &str = "Roku/9.0.0 UPnP/1.0 Roku/9.0.0";

/// Unicast answer to a search
pub fn search_reply(identity: &DeviceIdentity) -> String {
    let date = chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT");
    format!(
        "HTTP/1.1 200 OK\r\n\
         Cache-Control: max-age={}\r\n\
         DATE: {}\r\n\
         EXT:\r\n\
         Location: {}\r\n\
         Server: {}\r\n\
         ST: {}\r\n\
         USN: uuid:roku:ecp:{}\r\n\
         \r\n",
        MAX_AGE,
        date,
        identity.location(),
        SERVER,
        ECP_SEARCH_TARGET,
        identity.usn
    )
}

/// Periodic presence announcement sent to the multicast group
pub fn notify_alive(identity: &DeviceIdentity) -> String {
    format!(
        "NOTIFY * HTTP/1.1\r\n\
         HOST: {}:{}\r\n\
         Cache-Control: max-age={}\r\n\
         NT: upnp:rootdevice\r\n\
         NTS: ssdp:alive\r\n\
         Location: {}\r\n\
         Server: {}\r\n\
         USN: uuid:roku:ecp:{}\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR,
        SSDP_PORT,
        MAX_AGE,
        identity.location(),
        SERVER,
        identity.usn
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn identity(port: u16) -> DeviceIdentity {
        DeviceIdentity::new(
            "Roku",
            Some("ABC".to_string()),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
            port,
        )
    }

    #[test]
    fn test_search_reply_headers() {
        let reply = search_reply(&identity(8060));

        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("Cache-Control: max-age=300\r\n"));
        assert!(reply.contains("ST: roku:ecp\r\n"));
        assert!(reply.contains("Location: http://192.168.1.10:8060/\r\n"));
        assert!(reply.contains("USN: uuid:roku:ecp:ABC\r\n"));
        assert!(reply.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_notify_alive_headers() {
        let notify = notify_alive(&identity(0));

        assert!(notify.starts_with("NOTIFY * HTTP/1.1\r\n"));
        assert!(notify.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(notify.contains("NTS: ssdp:alive\r\n"));
        assert!(notify.contains("Location: http://192.168.1.10:0/\r\n"));
        assert!(notify.contains("USN: uuid:roku:ecp:ABC\r\n"));
    }
}
