use anyhow::{anyhow, Result};

#[macro_export]
macro_rules! print_result_err {
    ($context:expr, $result:expr $(,)?) => {{
        if let Err(err) = $result {
            log::error!("[{}:{}] Error {}: {:?}", ::std::file!(), ::std::line!(), $context, err);
        }
    }};
}

/// Parse the on/off toggles the command line uses.
pub fn parse_on_off(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(anyhow!("Couldn't parse '{}'. Possible values are on, off, true, false, 1, 0", s)),
    }
}

#[cfg(test)]
mod test {
    use super::parse_on_off;

    #[test]
    fn test_parse_on_off() {
        assert!(parse_on_off("on").unwrap());
        assert!(parse_on_off("TRUE").unwrap());
        assert!(!parse_on_off("off").unwrap());
        assert!(!parse_on_off("0").unwrap());
        assert!(parse_on_off("maybe").is_err());
    }
}
