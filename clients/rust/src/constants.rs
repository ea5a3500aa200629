use once_cell::sync::Lazy;
use url::Url;

pub static BASE_URL_ENV: &str = "ROSTER_BASE_URL";
pub static DEFAULT_BASE_URL: Lazy<Url> = Lazy::new(|| {
    // The production URL is only baked in if the build explicitly sets
    // ROSTER_DEFAULT_BASE_URL at compile time.
    let url_str = std::option_env!("ROSTER_DEFAULT_BASE_URL")
        .unwrap_or("https://api.roster.dev");
    Url::parse(url_str).expect("DEFAULT_BASE_URL")
});
