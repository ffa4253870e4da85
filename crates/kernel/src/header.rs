//! Page asset header: the scripts a backend page loads.

use serde::Serialize;
use tracing::debug;

/// Group used for relative assets registered without one.
const DEFAULT_GROUP: &str = "Core";

/// Something that collects script registrations for the current page.
pub trait AssetHeader: Send {
    /// Register a script. Registering the same script twice has no effect.
    fn add_js(&mut self, asset: JsAsset);
}

/// A script registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsAsset {
    /// Path relative to the group's `Js` directory, or an absolute URL path.
    pub path: String,

    /// Module group the script belongs to (e.g. `Core`).
    pub group: Option<String>,

    /// Whether the script may be bundled with other minified scripts.
    pub minify: bool,

    /// Whether `path` is used as-is instead of being resolved in a group.
    pub absolute: bool,

    /// Load with the `defer` attribute.
    pub defer: bool,

    /// Append the header's version as a cache-busting query parameter.
    pub cache_bust: bool,
}

impl JsAsset {
    /// Create a relative, minifiable, cache-busted, non-deferred script registration.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            group: None,
            minify: true,
            absolute: false,
            defer: false,
            cache_bust: true,
        }
    }

    /// Set the module group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Allow or forbid minification.
    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    /// Use the path as-is.
    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }

    /// Load with `defer`.
    pub fn defer(mut self) -> Self {
        self.defer = true;
        self
    }

    /// Enable or disable the cache-busting parameter.
    pub fn cache_bust(mut self, enabled: bool) -> Self {
        self.cache_bust = enabled;
        self
    }

    /// Resolve the URL the browser loads.
    pub fn url(&self, version: &str) -> String {
        let mut url = if self.absolute {
            self.path.clone()
        } else {
            let group = self.group.as_deref().unwrap_or(DEFAULT_GROUP);
            format!("/src/Backend/{group}/Js/{}", self.path.trim_start_matches('/'))
        };
        if self.cache_bust && !version.is_empty() {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str("m=");
            url.push_str(version);
        }
        url
    }
}

/// A script as handed to templates.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptTag {
    pub url: String,
    pub defer: bool,
}

/// Ordered, de-duplicated script registrations for one page.
#[derive(Debug, Default)]
pub struct Header {
    version: String,
    scripts: Vec<JsAsset>,
}

impl Header {
    /// Create a header whose cache-busting parameter is `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            scripts: Vec::new(),
        }
    }

    /// Registered scripts, in registration order.
    pub fn scripts(&self) -> &[JsAsset] {
        &self.scripts
    }

    /// Resolved script tags, in registration order.
    pub fn script_tags(&self) -> Vec<ScriptTag> {
        self.scripts
            .iter()
            .map(|asset| ScriptTag {
                url: asset.url(&self.version),
                defer: asset.defer,
            })
            .collect()
    }

    /// Assign the scripts to a template context as `jsFiles`.
    pub fn assign(&self, context: &mut tera::Context) {
        context.insert("jsFiles", &self.script_tags());
    }
}

impl AssetHeader for Header {
    fn add_js(&mut self, asset: JsAsset) {
        let duplicate = self
            .scripts
            .iter()
            .any(|existing| existing.path == asset.path && existing.group == asset.group);
        if duplicate {
            return;
        }
        debug!(path = %asset.path, group = ?asset.group, "script registered");
        self.scripts.push(asset);
    }
}
