//! Interface addresses and byte counters.

use std::ffi::CStr;
use std::fs;
use std::net::Ipv4Addr;

/// Returns the IPv4 address of `interface`, or of the default-route interface.
///
/// With no interface given and no default route, the first non-loopback
/// IPv4 address is used.
pub fn ipv4_address(interface: Option<&str>) -> Option<String> {
    let addresses = ipv4_addresses();
    match interface.map(str::to_string).or_else(default_interface) {
        Some(name) => addresses
            .into_iter()
            .find(|(iface, _)| *iface == name)
            .map(|(_, addr)| addr.to_string()),
        None => addresses
            .into_iter()
            .find(|(iface, addr)| iface != "lo" && !addr.is_loopback())
            .map(|(_, addr)| addr.to_string()),
    }
}

/// Reads the interface carrying the default route from /proc/net/route.
fn default_interface() -> Option<String> {
    let content = fs::read_to_string("/proc/net/route").ok()?;
    parse_default_route(&content)
}

fn parse_default_route(content: &str) -> Option<String> {
    content.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        (fields.len() >= 2 && fields[1] == "00000000").then(|| fields[0].to_string())
    })
}

/// Lists (interface, address) pairs via getifaddrs.
fn ipv4_addresses() -> Vec<(String, Ipv4Addr)> {
    let mut result = Vec::new();

    // SAFETY: getifaddrs is a standard POSIX function. The list is released
    // with freeifaddrs before returning.
    unsafe {
        let mut ifaddrs: *mut libc::ifaddrs = std::ptr::null_mut();
        if libc::getifaddrs(&mut ifaddrs) != 0 {
            return result;
        }

        let mut current = ifaddrs;
        while !current.is_null() {
            let ifa = &*current;
            if !ifa.ifa_name.is_null()
                && !ifa.ifa_addr.is_null()
                && (*ifa.ifa_addr).sa_family as i32 == libc::AF_INET
            {
                let name = CStr::from_ptr(ifa.ifa_name).to_string_lossy().into_owned();
                let sockaddr_in = ifa.ifa_addr as *const libc::sockaddr_in;
                let addr = Ipv4Addr::from((*sockaddr_in).sin_addr.s_addr.to_ne_bytes());
                result.push((name, addr));
            }
            current = ifa.ifa_next;
        }

        libc::freeifaddrs(ifaddrs);
    }

    result
}

/// Reads cumulative (rx_bytes, tx_bytes) for an interface.
pub fn read_counters(interface: &str) -> Option<(u64, u64)> {
    if interface.contains('/') {
        return None;
    }
    let read = |name: &str| -> Option<u64> {
        let path = format!("/sys/class/net/{}/statistics/{}", interface, name);
        fs::read_to_string(path).ok()?.trim().parse().ok()
    };
    Some((read("rx_bytes")?, read("tx_bytes")?))
}

/// Formats a byte rate with a decimal unit suffix.
pub fn format_rate(bytes_per_sec: f64) -> String {
    if bytes_per_sec >= 1_000_000_000.0 {
        format!("{:.1} GB/s", bytes_per_sec / 1_000_000_000.0)
    } else if bytes_per_sec >= 1_000_000.0 {
        format!("{:.1} MB/s", bytes_per_sec / 1_000_000.0)
    } else if bytes_per_sec >= 1_000.0 {
        format!("{:.1} KB/s", bytes_per_sec / 1_000.0)
    } else {
        format!("{:.0} B/s", bytes_per_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0 B/s");
        assert_eq!(format_rate(999.0), "999 B/s");
        assert_eq!(format_rate(1_500.0), "1.5 KB/s");
        assert_eq!(format_rate(2_000_000.0), "2.0 MB/s");
        assert_eq!(format_rate(3_100_000_000.0), "3.1 GB/s");
    }

    #[test]
    fn test_parse_default_route() {
        let content = "Iface\tDestination\tGateway\n\
                       wlan0\t0000A8C0\t00000000\n\
                       eth0\t00000000\t0100A8C0\n";
        assert_eq!(parse_default_route(content), Some("eth0".to_string()));
        assert_eq!(parse_default_route("Iface\tDestination\n"), None);
    }

    #[test]
    fn test_loopback_address() {
        assert_eq!(ipv4_address(Some("lo")), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_counters_reject_paths() {
        assert_eq!(read_counters("../lo"), None);
        assert_eq!(read_counters("no-such-iface0"), None);
    }
}
