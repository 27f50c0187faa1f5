//! Configuration for a forge instance.

/// Main configuration for catalog loading and station compilation.
///
/// # Examples
///
/// ```
/// use reagent_forge::ForgeConfig;
///
/// let config = ForgeConfig {
///     namespace: "lab".to_string(),
///     ..ForgeConfig::default()
/// };
/// assert_eq!(config.worker_threads, 2);
/// assert!(config.catalog.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeConfig {
    /// Prefix of every station id (`"<namespace>_<key>"`).
    pub namespace: String,
    /// Worker threads of the compilation pool. Values below 1 are raised to 1.
    pub worker_threads: usize,
    /// Custom catalog TOML; `None` uses the embedded default catalog.
    pub catalog: Option<String>,
    /// Custom translation table TOML; `None` leaves compound names untranslated.
    pub translations: Option<String>,
}

pub const DEFAULT_NAMESPACE: &str = "solution";

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            worker_threads: 2,
            catalog: None,
            translations: None,
        }
    }
}

impl ForgeConfig {
    pub(crate) fn effective_workers(&self) -> usize {
        self.worker_threads.max(1)
    }
}
