//! CLI argument validators.

/// Parse and validate a TCP port (1-65535).
pub fn parse_port(s: &str) -> Result<u16, String> {
    let value: u16 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid port"))?;

    if value == 0 {
        return Err("port must be between 1 and 65535".to_string());
    }

    Ok(value)
}

/// Parse and validate a bind host.
pub fn parse_host(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("host must not be empty".to_string());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(format!("'{trimmed}' is not a valid host"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_valid() {
        assert_eq!(parse_port("3456").ok(), Some(3456));
        assert_eq!(parse_port("65535").ok(), Some(65535));
    }

    #[test]
    fn test_parse_port_invalid() {
        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert!(parse_port("http").is_err());
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(parse_host(" 127.0.0.1 ").ok().as_deref(), Some("127.0.0.1"));
        assert!(parse_host("").is_err());
        assert!(parse_host("local host").is_err());
    }
}
