use std::sync::OnceLock;
use tera::Tera;

static TERA: OnceLock<Tera> = OnceLock::new();

// Compiled in so the binary renders the same pages wherever it runs.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("history.html", include_str!("../templates/history.html")),
    ("upload.html", include_str!("../templates/upload.html")),
    ("check.html", include_str!("../templates/check.html")),
];

pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        if let Err(e) = tera.add_raw_templates(TEMPLATES.iter().copied()) {
            tracing::error!("Failed to load templates: {:?}", e);
        }
        tera
    })
}
