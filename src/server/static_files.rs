//! The embedded single-page form. Baked into the binary so the app ships
//! as one executable plus its artifact directory.

pub const INDEX_HTML: &str = include_str!("../../assets/index.html");
pub const STYLE_CSS: &str = include_str!("../../assets/style.css");
pub const APP_JS: &str = include_str!("../../assets/app.js");
