//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request. `None` means unbounded.
    pub max_page_size: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: None,
        }
    }
}

impl PaginationConfig {
    /// The page number to use for the raw query parameter `requested`.
    ///
    /// Missing, non-numeric and non-positive values fall back to the default page.
    pub fn page_number(&self, requested: Option<&str>) -> u64 {
        parse_positive(requested).unwrap_or(self.default_page)
    }

    /// The page size to use for the raw query parameter `requested`.
    ///
    /// Missing, non-numeric and non-positive values fall back to the default
    /// page size. Sizes above `max_page_size` are clamped to it.
    pub fn page_size(&self, requested: Option<&str>) -> u64 {
        let page_size = parse_positive(requested).unwrap_or(self.default_page_size);

        match self.max_page_size {
            Some(max_page_size) => page_size.min(max_page_size),
            None => page_size,
        }
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|&value| value > 0)
}
