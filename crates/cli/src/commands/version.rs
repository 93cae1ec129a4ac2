//! `version` command

/// Version line printed by `envsync version`
pub fn version_line() -> String {
    format!("envsync {}", env!("CARGO_PKG_VERSION"))
}

pub fn run() {
    println!("{}", version_line());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        assert_eq!(version_line(), format!("envsync {}", env!("CARGO_PKG_VERSION")));
        assert!(version_line().starts_with("envsync 0."));
    }
}
