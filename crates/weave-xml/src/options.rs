//! Codec configuration.

/// Options shared by [`crate::Encoder`] and [`crate::Decoder`].
///
/// # Example
///
/// ```
/// use rhizome_weave_xml::CodecOptions;
///
/// let options = CodecOptions {
///     max_depth: 64,
///     indent: None,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CodecOptions {
    /// Maximum nesting of expressions and member bindings.
    ///
    /// Deeper input fails with `DepthLimitExceeded` instead of exhausting
    /// the stack. Each level costs a few kilobytes of stack in debug builds,
    /// so raise this only on threads with a larger stack.
    ///
    /// Default: 128
    pub max_depth: usize,

    /// Spaces per level when writing text; `None` writes a single line.
    ///
    /// Default: Some(2)
    pub indent: Option<usize>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            indent: Some(2),
        }
    }
}

impl CodecOptions {
    /// Element nesting a document may reach when parsed.
    ///
    /// An expression level spans at most four elements (a list initializer's
    /// `Initializers`, `ElementInit` and `Arguments` around the next
    /// `Expression`), plus the type and member descriptors of the innermost
    /// level.
    pub fn element_depth(&self) -> usize {
        self.max_depth.saturating_mul(4).saturating_add(8)
    }
}
