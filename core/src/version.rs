/// Crate version, shared by `--version` and the default `User-Agent`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USER_AGENT: &str = concat!("reqline/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_version() {
        assert_eq!(USER_AGENT, format!("reqline/{VERSION}"));
    }
}
