//! Variable expansion for transform root directories.
//!
//! Transform roots may be given as `$VAR` or `${VAR}` templates, e.g.
//! `$ACES_DEV/transforms/ctl`. Variables are looked up in explicitly set
//! values first, then in the process environment.
//!
//! # Example
//!
//! ```
//! use ocio_aces_discover::Context;
//!
//! let mut ctx = Context::without_env();
//! ctx.set("ACES_DEV", "/opt/aces-dev");
//!
//! assert_eq!(ctx.resolve("${ACES_DEV}/transforms/ctl"), "/opt/aces-dev/transforms/ctl");
//! assert_eq!(ctx.resolve("$UNSET/ctl"), "$UNSET/ctl");
//! ```

use std::collections::HashMap;
use std::env;
use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Chars;

use tracing::debug;

use crate::format::FormatProfile;

/// Variable lookup used to expand root directory templates.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, String>,
    use_env: bool,
}

impl Context {
    /// Creates a context falling back to the process environment.
    #[inline]
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
            use_env: true,
        }
    }

    /// Creates a context that only knows explicitly set variables.
    #[inline]
    pub fn without_env() -> Self {
        Self::default()
    }

    /// Sets a variable, shadowing any environment variable of the same name.
    #[inline]
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Looks a variable up.
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .cloned()
            .or_else(|| self.use_env.then(|| env::var(name).ok()).flatten())
    }

    /// Expands every `$VAR` and `${VAR}` reference in `input`.
    ///
    /// Unknown variables are kept verbatim.
    pub fn resolve(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }

            if chars.next_if_eq(&'{').is_some() {
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                match self.get(&name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(&name);
                        out.push('}');
                    }
                }
                continue;
            }

            let name = read_identifier(&mut chars);
            match self.get(&name) {
                _ if name.is_empty() => out.push('$'),
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(&name);
                }
            }
        }

        out
    }

    /// Returns the transforms root directory of the given profile.
    ///
    /// The profile's environment variable overrides its default root; the
    /// chosen value is expanded with [`Context::resolve`].
    pub fn transforms_root(&self, profile: &FormatProfile) -> PathBuf {
        let template = self
            .get(profile.root_env)
            .unwrap_or_else(|| profile.default_root.to_string_lossy().into_owned());
        let root = PathBuf::from(self.resolve(&template));
        debug!(root = %root.display(), variable = profile.root_env, "transforms root");
        root
    }
}

fn read_identifier(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        name.push(c);
    }
    name
}
