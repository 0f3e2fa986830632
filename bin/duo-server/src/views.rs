//! Template environment for server-rendered pages.

use minijinja::Environment;
use serde::Serialize;

pub const INDEX: &str = "index.html";

#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Load the templates embedded at compile time.
    pub fn load() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX, include_str!("../templates/index.html"))?;
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_lists_pets_and_labels() {
        let views = Views::load().unwrap();
        let html = views
            .render(
                INDEX,
                json!({
                    "uuid": "abc",
                    "version": "1.0",
                    "deploymentColor": "green",
                    "framework": "Axum",
                    "frameworkVersion": "0.8",
                    "language": "Rust",
                    "languageVersion": "1.85.0",
                    "runtime": "Tokio",
                    "database": "MySQL",
                    "pets": [{ "id": 1, "name": "Rex" }],
                }),
            )
            .unwrap();
        assert!(html.contains("MySQL"));
        assert!(html.contains("#1 Rex"));
        assert!(!html.contains("No pets yet."));
    }

    #[test]
    fn index_handles_no_pets() {
        let views = Views::load().unwrap();
        let html = views.render(INDEX, json!({ "pets": [] })).unwrap();
        assert!(html.contains("No pets yet."));
    }

    #[test]
    fn values_are_html_escaped() {
        let views = Views::load().unwrap();
        let html = views
            .render(INDEX, json!({ "pets": [{ "id": 2, "name": "<b>Tom</b>" }] }))
            .unwrap();
        assert!(html.contains("&lt;b&gt;Tom"));
        assert!(!html.contains("<b>Tom"));
    }
}
