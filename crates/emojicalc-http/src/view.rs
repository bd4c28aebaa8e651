//! View template rendering.
//!
//! Templates are plain text with `%PLACEHOLDER%` tokens. A [`ViewRenderer`]
//! loads each named template from its [`TemplateSource`] once, caches the raw
//! text for its whole lifetime, and substitutes placeholders on every render.
//!
//! Substitution works like a translation table: at each position the longest
//! matching key wins, replaced text is never scanned again, and tokens with
//! no supplied value are left as they are.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::ViewError;

/// Placeholder values keyed by token, e.g. `"%BODY%"`.
pub type Placeholders = IndexMap<String, String>;

/// Backing storage for named templates.
pub trait TemplateSource: Send + Sync + fmt::Debug {
    /// Loads the raw text of the template called `name`.
    fn load(&self, name: &str) -> Result<String, ViewError>;
}

/// Loads `<directory>/<name>.html` from disk.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    directory: PathBuf,
}

impl FileSystemSource {
    /// Creates a source reading from `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Returns the template directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file a template name resolves to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.html"))
    }
}

impl TemplateSource for FileSystemSource {
    fn load(&self, name: &str) -> Result<String, ViewError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ViewError::not_found(name, path));
        }
        fs::read_to_string(&path).map_err(|e| ViewError::read(path, e))
    }
}

/// In-memory templates.
///
/// Clones share the same storage, so a test can keep a handle and change a
/// template after handing the source to a renderer.
///
/// # Example
///
/// ```
/// use emojicalc_http::{MemorySource, TemplateSource};
///
/// let source = MemorySource::new().with_template("hello", "Hello %NAME%");
/// assert_eq!(source.load("hello").unwrap(), "Hello %NAME%");
/// assert!(source.load("missing").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, builder style.
    #[must_use]
    pub fn with_template(self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.write().insert(name.into(), content.into());
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, name: &str) -> Result<String, ViewError> {
        self.templates
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ViewError::not_found(name, name))
    }
}

/// Renders named templates with placeholder substitution.
///
/// The cache is keyed by template name and never evicted. Sources are read
/// outside the cache lock, so a slow first load of one template does not
/// stall renders of others. If two threads race on the same uncached name,
/// both read it and the first insert is kept.
///
/// # Example
///
/// ```
/// use emojicalc_http::{MemorySource, Placeholders, ViewRenderer};
///
/// let renderer = ViewRenderer::new(
///     MemorySource::new().with_template("greeting", "Hello %NAME%, %MISSING%"),
/// );
///
/// let mut placeholders = Placeholders::new();
/// placeholders.insert("%NAME%".to_string(), "Ada".to_string());
///
/// let page = renderer.render("greeting", &placeholders).unwrap();
/// assert_eq!(page, "Hello Ada, %MISSING%");
/// ```
#[derive(Debug)]
pub struct ViewRenderer {
    source: Box<dyn TemplateSource>,
    cache: Mutex<HashMap<String, Arc<str>>>,
}

impl ViewRenderer {
    /// Creates a renderer over a template source.
    #[must_use]
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a renderer reading `<directory>/<name>.html` files.
    #[must_use]
    pub fn from_directory(directory: impl Into<PathBuf>) -> Self {
        Self::new(FileSystemSource::new(directory))
    }

    /// Renders a template with the given placeholder values.
    pub fn render(&self, name: &str, placeholders: &Placeholders) -> Result<String, ViewError> {
        let template = self.template(name)?;
        Ok(substitute(&template, placeholders))
    }

    /// Renders a template with no placeholder values.
    pub fn render_plain(&self, name: &str) -> Result<String, ViewError> {
        Ok(self.template(name)?.to_string())
    }

    /// Returns `true` if a template has already been loaded.
    #[must_use]
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.lock().contains_key(name)
    }

    fn template(&self, name: &str) -> Result<Arc<str>, ViewError> {
        if let Some(template) = self.cache.lock().get(name) {
            return Ok(Arc::clone(template));
        }

        let loaded: Arc<str> = self.source.load(name)?.into();
        let template = Arc::clone(
            self.cache
                .lock()
                .entry(name.to_string())
                .or_insert_with(|| {
                    tracing::debug!(view = name, bytes = loaded.len(), "Cached view template");
                    Arc::clone(&loaded)
                }),
        );
        Ok(template)
    }
}

/// Replaces placeholder tokens in a single, non-recursive pass.
///
/// At each position the longest matching key is replaced. Empty keys are
/// ignored.
#[must_use]
pub fn substitute(template: &str, placeholders: &Placeholders) -> String {
    let mut keys: Vec<(&str, &str)> = placeholders
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    if keys.is_empty() {
        return template.to_string();
    }
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(ch) = rest.chars().next() {
        for (key, value) in &keys {
            if let Some(after) = rest.strip_prefix(key) {
                rendered.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        rendered.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn placeholders(pairs: &[(&str, &str)]) -> Placeholders {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_replaces_all_occurrences() {
        let rendered = substitute("%A% and %A%", &placeholders(&[("%A%", "x")]));
        assert_eq!(rendered, "x and x");
    }

    #[test]
    fn test_substitute_leaves_unknown_tokens() {
        let rendered = substitute("%A% %B%", &placeholders(&[("%A%", "x")]));
        assert_eq!(rendered, "x %B%");
    }

    #[test]
    fn test_substitute_is_not_recursive() {
        let rendered = substitute(
            "%A%",
            &placeholders(&[("%A%", "%B%"), ("%B%", "nope")]),
        );
        assert_eq!(rendered, "%B%");
    }

    #[test]
    fn test_substitute_prefers_longest_key() {
        let rendered = substitute(
            "%OPERATOR% %OPERATORNAME%",
            &placeholders(&[("%OPERATOR%", "-"), ("%OPERATORNAME%", "subtraction")]),
        );
        assert_eq!(rendered, "- subtraction");
    }

    #[test]
    fn test_substitute_handles_multibyte_text() {
        let rendered = substitute("👽 %X% 💀", &placeholders(&[("%X%", "👻")]));
        assert_eq!(rendered, "👽 👻 💀");
    }

    #[test]
    fn test_substitute_ignores_empty_keys() {
        let rendered = substitute("abc", &placeholders(&[("", "x")]));
        assert_eq!(rendered, "abc");
    }

    #[test]
    fn test_render_missing_view() {
        let renderer = ViewRenderer::new(MemorySource::new());
        let err = renderer.render_plain("nothing").unwrap_err();
        assert!(matches!(err, ViewError::NotFound { .. }));
        assert!(!renderer.is_cached("nothing"));
    }

    #[test]
    fn test_render_caches_first_content() {
        let source = MemorySource::new()
            .with_template("exampleFile", "This is an example of a %KIND% view");
        let renderer = ViewRenderer::new(source.clone());

        let first = renderer
            .render("exampleFile", &placeholders(&[("%KIND%", "rendered")]))
            .unwrap();
        assert_eq!(first, "This is an example of a rendered view");
        assert!(renderer.is_cached("exampleFile"));

        source.insert("exampleFile", "Changed %KIND%");
        let second = renderer
            .render("exampleFile", &placeholders(&[("%KIND%", "cached")]))
            .unwrap();
        assert_eq!(second, "This is an example of a cached view");
    }

    #[derive(Debug)]
    struct GatedSource {
        entered: Mutex<std::sync::mpsc::Sender<()>>,
        release: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl TemplateSource for GatedSource {
        fn load(&self, name: &str) -> Result<String, ViewError> {
            if name != "slow" {
                return Ok(name.to_string());
            }
            let _ = self.entered.lock().send(());
            self.release
                .lock()
                .recv_timeout(std::time::Duration::from_secs(5))
                .map(|()| name.to_string())
                .map_err(|_| ViewError::not_found(name, name))
        }
    }

    #[test]
    fn test_slow_load_does_not_block_other_views() {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let renderer = Arc::new(ViewRenderer::new(GatedSource {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }));

        let slow = {
            let renderer = Arc::clone(&renderer);
            std::thread::spawn(move || renderer.render_plain("slow"))
        };
        entered_rx.recv().unwrap();

        // Served while "slow" is still inside its source
        assert_eq!(renderer.render_plain("fast").unwrap(), "fast");
        assert!(!renderer.is_cached("slow"));

        release_tx.send(()).unwrap();
        assert_eq!(slow.join().unwrap().unwrap(), "slow");
        assert!(renderer.is_cached("slow"));
    }

    #[test]
    fn test_filesystem_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("hello.html")).unwrap();
        write!(file, "Hello %NAME%").unwrap();

        let renderer = ViewRenderer::from_directory(dir.path());
        let page = renderer
            .render("hello", &placeholders(&[("%NAME%", "world")]))
            .unwrap();
        assert_eq!(page, "Hello world");
    }

    #[test]
    fn test_filesystem_source_caches_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exampleFile.html");
        std::fs::write(&path, "This is an example of a rendered view").unwrap();

        let renderer = ViewRenderer::from_directory(dir.path());
        assert_eq!(
            renderer.render_plain("exampleFile").unwrap(),
            "This is an example of a rendered view"
        );

        std::fs::write(&path, "Something else").unwrap();
        assert_eq!(
            renderer.render_plain("exampleFile").unwrap(),
            "This is an example of a rendered view"
        );
    }

    #[test]
    fn test_filesystem_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSystemSource::new(dir.path());
        let err = source.load("absent").unwrap_err();
        let expected = format!("File {} does not exist", source.path_for("absent").display());
        assert_eq!(err.to_string(), expected);
    }

    proptest! {
        #[test]
        fn prop_text_without_tokens_is_unchanged(text in "[a-zA-Z0-9 <>/]{0,64}") {
            let rendered = substitute(&text, &placeholders(&[("%A%", "x")]));
            prop_assert_eq!(rendered, text);
        }

        #[test]
        fn prop_values_are_inserted_verbatim(value in "[%A-Z]{0,16}") {
            let rendered = substitute("[%A%]", &placeholders(&[("%A%", value.as_str())]));
            prop_assert_eq!(rendered, format!("[{value}]"));
        }
    }
}
