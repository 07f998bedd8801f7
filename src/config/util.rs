//! Configuration utility functions.

use super::ConfigError;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

/// Resolve a bind address string to a socket address.
///
/// An empty host binds all interfaces, matching the `:port` shorthand
/// common to Go tooling.
///
/// # Examples
/// ```ignore
/// parse_bind_addr(":8080")          -> 0.0.0.0:8080
/// parse_bind_addr("127.0.0.1:9000") -> 127.0.0.1:9000
/// parse_bind_addr("localhost:3000") -> first resolved address
/// ```
pub fn parse_bind_addr(addr: &str) -> Result<SocketAddr, ConfigError> {
    let addr = addr.trim();
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_owned(),
    };

    full.to_socket_addrs()
        .map_err(|e| ConfigError::Address(addr.to_owned(), e))?
        .next()
        .ok_or_else(|| {
            ConfigError::Address(
                addr.to_owned(),
                io::Error::new(io::ErrorKind::NotFound, "no address resolved"),
            )
        })
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_port_only_binds_all_interfaces() {
        let addr = parse_bind_addr(":8080").unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_explicit_host() {
        let addr = parse_bind_addr("127.0.0.1:9000").unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn test_ipv6() {
        let addr = parse_bind_addr("[::1]:8080").unwrap();
        assert!(addr.is_ipv6());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_bind_addr("8080").is_err());
        assert!(parse_bind_addr(":notaport").is_err());
    }
}
