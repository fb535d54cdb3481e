use bitcompass_config::BitcompassConfig;

/// Nested sections; their keys need a double underscore after the section name.
const NESTED_SECTIONS: [(&str, &str); 2] = [
    ("AUTH", "BITCOMPASS_AUTH__CALLBACK_TIMEOUT_SECS"),
    ("GENERAL", "BITCOMPASS_GENERAL__DEFAULT_LIMIT"),
];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &BitcompassConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &BitcompassConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    let has_url = !config.supabase_url.trim().is_empty();
    let has_key = !config.supabase_anon_key.trim().is_empty();
    if has_url != has_key {
        let missing = if has_url {
            "BITCOMPASS_SUPABASE_ANON_KEY"
        } else {
            "BITCOMPASS_SUPABASE_URL"
        };
        warnings.push(format!(
            "Backend config is incomplete: {missing} is not set, so login refresh and rules commands are unavailable."
        ));
    }

    for (section, example) in NESTED_SECTIONS {
        let single = format!("BITCOMPASS_{section}_");
        let double = format!("BITCOMPASS_{section}__");
        if env_keys
            .iter()
            .any(|key| key.starts_with(&single) && !key.starts_with(&double))
        {
            warnings.push(format!(
                "BITCOMPASS_{section}_* env vars are ignored. Use double underscores (example: {example})."
            ));
        }
    }

    warnings
}
