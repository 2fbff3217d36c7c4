//! Namespaced class names such as `/Billing/InvoiceService`.
//!
//! A class path is one or more alphabetic segments separated by `/`,
//! optionally starting with `/` (absolute). The last segment is the class
//! name and the rest is its namespace.
//!
//! ```
//! use enclosure::ClassPath;
//!
//! let path = ClassPath::parse("Billing/Invoices/InvoiceService").unwrap();
//! assert!(path.is_relative());
//! assert_eq!(path.class_name(), "InvoiceService");
//! assert_eq!(path.namespace(), "Billing/Invoices");
//! assert_eq!(path.to_absolute().to_string(), "/Billing/Invoices/InvoiceService");
//! ```

use core::fmt;

use crate::error::Error;

#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ClassPath {
    absolute: bool,
    segments: Vec<String>,
}

impl ClassPath {
    /// Parses `text`, failing with `InvalidClassPath` on empty segments,
    /// trailing slashes or non-alphabetic characters.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let (absolute, rest) = match text.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let segments: Vec<String> = rest.split('/').map(str::to_string).collect();
        let valid = segments
            .iter()
            .all(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphabetic()));

        if !valid {
            return Err(Error::invalid_class_path(text));
        }

        Ok(Self { absolute, segments })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_relative(&self) -> bool {
        !self.absolute
    }

    pub fn class_name(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The namespace as text. Absolute paths keep their leading `/`; a path
    /// with no namespace returns `/`.
    pub fn namespace(&self) -> String {
        let segments = self.namespace_segments();

        if segments.is_empty() {
            return "/".to_string();
        }

        let joined = segments.join("/");
        if self.absolute {
            format!("/{}", joined)
        } else {
            joined
        }
    }

    pub fn namespace_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn to_absolute(&self) -> Self {
        Self {
            absolute: true,
            segments: self.segments.clone(),
        }
    }
}

impl fmt::Display for ClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        f.write_str(&self.segments.join("/"))
    }
}

impl std::str::FromStr for ClassPath {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}
