use std::path::Path;

pub struct Utils;

impl Utils {
    /// Extract the port from a local `address:port` column.
    ///
    /// Handles the formats `ss` and `lsof` print:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1]%eth0:546"
    /// - Scoped: "127.0.0.53%lo:53"
    /// - lsof connected sockets: "10.0.0.2:50000->1.1.1.1:443"
    pub fn local_port(address: &str) -> Option<u16> {
        let local = address.split("->").next()?;
        let (_, port_str) = local.rsplit_once(':')?;
        port_str.parse().ok()
    }

    /// First existing path among `candidates`, or the bare program name so
    /// the lookup falls back to `PATH`.
    pub fn resolve_binary(candidates: &[&str], program: &str) -> String {
        candidates
            .iter()
            .find(|c| Path::new(c).exists())
            .map(|c| c.to_string())
            .unwrap_or_else(|| program.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4_address() {
        assert_eq!(Utils::local_port("127.0.0.1:3000"), Some(3000));
        assert_eq!(Utils::local_port("*:8080"), Some(8080));
        assert_eq!(Utils::local_port("0.0.0.0:22"), Some(22));
    }

    #[test]
    fn test_parse_ipv6_address() {
        assert_eq!(Utils::local_port("[::1]:3000"), Some(3000));
        assert_eq!(Utils::local_port("[fe80::1]%eth0:546"), Some(546));
        assert_eq!(Utils::local_port("[::ffff:127.0.0.1]:63342"), Some(63342));
    }

    #[test]
    fn test_parse_scoped_and_connected() {
        assert_eq!(Utils::local_port("127.0.0.53%lo:53"), Some(53));
        assert_eq!(Utils::local_port("10.0.0.2:50000->1.1.1.1:443"), Some(50000));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Utils::local_port("*:*"), None);
        assert_eq!(Utils::local_port("no-port"), None);
        assert_eq!(Utils::local_port("host:99999"), None);
    }
}
