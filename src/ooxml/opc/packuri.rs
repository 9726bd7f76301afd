/// Provides the PackURI value type and utilities for working with package URIs.
///
/// A PackURI names a part inside an OPC package. It always begins with a forward
/// slash and uses forward slashes as separators, e.g. `/ppt/slides/slide1.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// Returns an error message if the URI doesn't start with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relative reference (like `../media/image1.png`) against a base
    /// URI (like `/ppt/slides`) into an absolute PackURI (`/ppt/media/image1.png`).
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(normalize_path(&joined))
    }

    /// Directory portion of this PackURI, `/ppt/slides` for `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Filename portion, `slide1.xml` for `/ppt/slides/slide1.xml`.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Extension without the leading period, lowercase as stored.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// Partname index for tuple partnames, e.g. 21 for `/ppt/slides/slide21.xml`.
    pub fn idx(&self) -> Option<u32> {
        let stem = self.stem();
        let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || digits == stem.len() {
            return None;
        }
        atoi_simd::parse::<u32>(stem[stem.len() - digits..].as_bytes()).ok()
    }

    /// Template for allocating sibling partnames of the same family.
    ///
    /// `/ppt/charts/chart3.xml` becomes `/ppt/charts/chart%d.xml`; names without
    /// a numeric suffix get one appended before the extension.
    pub fn numbered_template(&self) -> String {
        let stem = self.stem();
        let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
        let dir = self.base_uri().trim_end_matches('/');
        let ext = self.ext();
        if ext.is_empty() {
            format!("{}/{}%d", dir, prefix)
        } else {
            format!("{}/{}%d.{}", dir, prefix, ext)
        }
    }

    /// The membername (URI with leading slash stripped), as stored in the ZIP.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Relative reference from `base_uri` to this PackURI.
    ///
    /// `/ppt/media/image1.png` seen from `/ppt/slides` is `../media/image1.png`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from_parts: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to_parts: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();

        let common = from_parts
            .iter()
            .zip(to_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = Vec::with_capacity(from_parts.len() + to_parts.len());
        segments.extend(std::iter::repeat_n("..", from_parts.len() - common));
        segments.extend(&to_parts[common..]);
        segments.join("/")
    }

    /// PackURI of the `.rels` part belonging to this PackURI.
    ///
    /// `/ppt/slides/_rels/slide1.xml.rels` for `/ppt/slides/slide1.xml`, and
    /// `/_rels/.rels` for the package pseudo-partname.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base_uri = self.base_uri();
        if base_uri == "/" {
            Self::new(format!("/_rels/{}.rels", self.filename()))
        } else {
            Self::new(format!("{}/_rels/{}.rels", base_uri, self.filename()))
        }
    }

    /// Get the full URI string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    fn stem(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        }
    }
}

/// Resolve `.` and `..` segments of an absolute slash-separated path.
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            _ => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";
