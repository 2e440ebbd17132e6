/// Directory configuration for field limits and listing sizes
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Maximum category name length in characters
    pub max_category_name_len: usize,

    /// Maximum page title length in characters
    pub max_page_title_len: usize,

    /// Maximum page URL length in characters (after normalization)
    pub max_page_url_len: usize,

    /// Maximum number of category suggestions returned (0 = unlimited)
    pub max_suggestions: usize,

    /// Number of categories and pages shown on the index
    pub top_n: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            max_category_name_len: 128,
            max_page_title_len: 128,
            max_page_url_len: 200,
            max_suggestions: 8,
            top_n: 5,
        }
    }
}

impl DirectoryConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum category name length
    pub fn with_max_category_name_len(mut self, len: usize) -> Self {
        self.max_category_name_len = len;
        self
    }

    /// Set maximum page title length
    pub fn with_max_page_title_len(mut self, len: usize) -> Self {
        self.max_page_title_len = len;
        self
    }

    /// Set maximum page URL length
    pub fn with_max_page_url_len(mut self, len: usize) -> Self {
        self.max_page_url_len = len;
        self
    }

    /// Set the suggestion cap (0 = unlimited)
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Set how many entries the index lists
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_category_name_len == 0 {
            return Err("max_category_name_len must be greater than 0".to_string());
        }

        if self.max_page_title_len == 0 {
            return Err("max_page_title_len must be greater than 0".to_string());
        }

        // Shortest storable URL is the scheme prefix plus one character
        if self.max_page_url_len <= "http://".len() {
            return Err("max_page_url_len must be longer than the http:// prefix".to_string());
        }

        if self.top_n == 0 {
            return Err("top_n must be greater than 0".to_string());
        }

        Ok(())
    }
}
