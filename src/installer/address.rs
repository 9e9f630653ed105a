use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddrError {
    Invalid { addr: String, reason: &'static str },
    InvalidPort { addr: String, port: String },
}

impl fmt::Display for AddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { addr, reason } => write!(
                f,
                "Guard server address is invalid. Reason: address {}: {}.",
                addr, reason
            ),
            Self::InvalidPort { addr, port } => write!(
                f,
                "Guard server port is invalid. Reason: {:?} in address {} is not a port number.",
                port, addr
            ),
        }
    }
}

impl std::error::Error for AddrError {}

/// `host:port` of the guard service, `[v6]:port` for IPv6 hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddr {
    pub host: String,
    pub port: u16,
}

impl ServerAddr {
    pub fn parse(addr: &str) -> Result<Self, AddrError> {
        let invalid = |reason| AddrError::Invalid {
            addr: addr.to_string(),
            reason,
        };

        let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
            let (host, after) = rest.split_once(']').ok_or_else(|| invalid("missing ']'"))?;
            let port = after
                .strip_prefix(':')
                .ok_or_else(|| invalid("missing port"))?;
            (host, port)
        } else {
            let (host, port) = addr.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
            if host.contains(':') {
                return Err(invalid("too many colons"));
            }
            (host, port)
        };

        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = port.parse::<u16>().map_err(|_| AddrError::InvalidPort {
            addr: addr.to_string(),
            port: port.to_string(),
        })?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
