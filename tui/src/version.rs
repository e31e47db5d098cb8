/// The dashboard version.
///
/// Release builds may inject the tag version through the `ZOEA_VERSION` environment variable;
/// otherwise this is the workspace package version.
pub const ZOEA_VERSION: &str = match option_env!("ZOEA_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
