//! One page of a server-side paginated set (`@set`)

/// A batch of set members plus the cursor for the next batch
///
/// `after` is `None` on the final page. An unmaterialized set
/// (`{"@set": "<cursor>"}`) decodes to an empty page whose `after` holds the
/// cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Members of this page, in server order
    pub data: Vec<T>,
    /// Opaque cursor for the next page
    pub after: Option<String>,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(data: Vec<T>, after: Option<String>) -> Self {
        Page { data, after }
    }

    /// True if no further pages follow
    pub fn is_last(&self) -> bool {
        self.after.is_none()
    }

    /// Transform every member, keeping the cursor
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            after: self.after,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            data: Vec::new(),
            after: None,
        }
    }
}
