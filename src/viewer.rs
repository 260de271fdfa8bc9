//! Full-screen viewer route: `/og/<percent-encoded image url>`

use crate::region::escape_attr;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

/// Route that shows `image_url` full-screen
pub fn route_for(prefix: &str, image_url: &str) -> String {
    format!("{}{}", prefix, utf8_percent_encode(image_url, NON_ALPHANUMERIC))
}

/// Image URL carried by a viewer route, or `None` if `path` is not under `prefix`
pub fn image_url_from_path(prefix: &str, path: &str) -> Option<String> {
    let encoded = path.strip_prefix(prefix)?;
    Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned())
}

pub fn render_page(image_url: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Generated OG</title></head>\n\
         <body style=\"margin:0;display:flex;justify-content:center;align-items:center;height:100vh;background:#f3f4f6\">\n\
         <img src=\"{}\" alt=\"Generated OG\" style=\"max-width:100%;height:auto\">\n\
         </body>\n</html>\n",
        escape_attr(image_url)
    )
}
