//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server templates (index.html bootstrap page)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{INDEX_HTML, RenderContext};
//!
//! let ctx = RenderContext::new("main.wasm", argv, env);
//! let html = INDEX_HTML.render(&ctx);
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use crate::utils::escape::js_string;
    use std::ffi::OsString;

    /// Data embedded into the bootstrap page's script.
    #[derive(Debug, Clone, Default)]
    pub struct RenderContext {
        /// Artifact URL, relative to the page.
        pub artifact: String,
        /// Program arguments (`os.Args`).
        pub argv: Vec<String>,
        /// Program environment, in process order.
        pub env: Vec<(String, String)>,
    }

    impl RenderContext {
        pub fn new(
            artifact: impl Into<String>,
            argv: Vec<String>,
            env: Vec<(String, String)>,
        ) -> Self {
            Self {
                artifact: artifact.into(),
                argv,
                env,
            }
        }

        /// Environment of the current process.
        ///
        /// Non-UTF-8 entries are converted lossily rather than dropped.
        pub fn process_env() -> Vec<(String, String)> {
            std::env::vars_os()
                .map(|(k, v): (OsString, OsString)| {
                    (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned())
                })
                .collect()
        }

        /// `go.argv` as a JS array literal.
        fn argv_literal(&self) -> String {
            let items: Vec<_> = self
                .argv
                .iter()
                .map(|a| format!("\"{}\"", js_string(a)))
                .collect();
            format!("[{}]", items.join(", "))
        }

        /// `go.env` as a JS object literal.
        fn env_literal(&self) -> String {
            let items: Vec<_> = self
                .env
                .iter()
                .map(|(k, v)| format!("\"{}\": \"{}\"", js_string(k), js_string(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }

    impl TemplateVars for RenderContext {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__ARTIFACT__", &js_string(&self.artifact))
                .replace("__ARGV__", &self.argv_literal())
                .replace("__ENV__", &self.env_literal())
        }
    }

    /// Bootstrap page: loads the runtime shim, runs the module, and reloads
    /// when `_wait` completes.
    pub const INDEX_HTML: Template<RenderContext> = Template::new(include_str!("serve/index.html"));

}
