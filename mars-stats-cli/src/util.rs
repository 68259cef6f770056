use anyhow::{Context, Result};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated generation list such as `1,2,3`.
pub fn parse_generations(raw: &str) -> Result<Vec<u32>> {
    split_csv(raw)
        .iter()
        .map(|token| {
            token
                .parse::<u32>()
                .with_context(|| format!("invalid generation {token:?}"))
        })
        .collect()
}

/// Quote a CSV field when it contains a separator, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
