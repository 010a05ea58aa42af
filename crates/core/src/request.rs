/// One optimization request as received from the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeRequest {
    pub tag: String,
    pub raw_filter: Option<String>,
    pub model: Option<String>,
    pub raw_text: Option<String>,
}

impl OptimizeRequest {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), raw_filter: None, model: None, raw_text: None }
    }

    #[must_use]
    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = Some(raw_text.into());
        self
    }

    #[must_use]
    pub fn with_raw_filter(mut self, raw_filter: impl Into<String>) -> Self {
        self.raw_filter = Some(raw_filter.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Second argument of the optimize procedure: the raw text when present,
    /// otherwise the filter expression.
    #[must_use]
    pub fn procedure_input(&self) -> Option<&str> {
        self.raw_text.as_deref().or(self.raw_filter.as_deref())
    }
}
