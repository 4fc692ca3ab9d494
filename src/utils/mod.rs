pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{UrlInfo, inspect_url, is_valid_url};
