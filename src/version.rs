const fn version_or_cargo_default(opt: Option<&'static str>) -> &'static str {
    match opt {
        Some(val) => val,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Build version, overridable at compile time through `PRESENCE_ANALYZER_VERSION`.
pub const VERSION: &str = version_or_cargo_default(option_env!("PRESENCE_ANALYZER_VERSION"));
