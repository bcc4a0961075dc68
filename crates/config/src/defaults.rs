pub fn default_base_pair() -> String {
    "USDTRY".to_string()
}

pub fn default_minimum_source_count() -> usize {
    2
}

pub fn default_fixed_feeds() -> Vec<String> {
    vec!["pf1".to_string(), "pf2".to_string()]
}

pub fn default_supported_pairs() -> Vec<String> {
    vec![
        "USDTRY".to_string(),
        "EURUSD".to_string(),
        "GBPUSD".to_string(),
    ]
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
