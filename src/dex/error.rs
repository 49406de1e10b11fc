use std::fmt;

macro_rules! err {
    ($kind:ident, $msg:literal) => {
        $crate::dex::error::DexError::new($crate::dex::error::DexErrorKind::$kind, $msg)
    };
    ($kind:ident, $fmtstr:literal, $($args:tt)*) => {
        $crate::dex::error::DexError::new($crate::dex::error::DexErrorKind::$kind, format!($fmtstr, $($args)*))
    };
}

#[macro_export]
macro_rules! fail {
    ($kind:ident, $msg:literal) => {
        return Err($crate::dex::error::DexError::new($crate::dex::error::DexErrorKind::$kind, $msg))
    };
    ($kind:ident, $fmtstr:literal, $($args:tt)*) => {
        return Err($crate::dex::error::DexError::new($crate::dex::error::DexErrorKind::$kind, format!($fmtstr, $($args)*)))
    };
}

/// What went wrong while reading a container.
///
/// Every kind aborts the load in progress; none of them is recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexErrorKind
{
    /// A read or a jump would go past the end of the buffer.
    OutOfBounds,
    /// A structural check failed: header constants, pool indices, string encoding, handler links.
    Format,
    /// A static value carries a type tag this loader does not know.
    UnsupportedValue,
    /// The offset stack grew past the configured depth.
    ResourceLimit,
    /// Loader bookkeeping went out of balance.
    Internal,
}

impl fmt::Display for DexErrorKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let s = match self
        {
            DexErrorKind::OutOfBounds => "out of bounds",
            DexErrorKind::Format => "format error",
            DexErrorKind::UnsupportedValue => "unsupported value type",
            DexErrorKind::ResourceLimit => "resource limit",
            DexErrorKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexError
{
    kind: DexErrorKind,
    msg: String,
    contexts: Vec<String>,
}

impl DexError
{
    pub(crate) fn new(kind: DexErrorKind, msg: impl Into<String>) -> Self
    {
        DexError {
            kind,
            msg: msg.into(),
            contexts: Vec::new(),
        }
    }

    pub(crate) fn with_context(base: DexError, context: impl Into<String>) -> Self
    {
        let mut contexts = base.contexts;
        contexts.push(context.into());
        DexError { kind: base.kind, msg: base.msg, contexts }
    }

    pub fn kind(&self) -> DexErrorKind
    {
        self.kind
    }

    pub fn message(&self) -> &str
    {
        &self.msg
    }

    /// Sections the failure happened in, innermost first.
    pub fn contexts(&self) -> &[String]
    {
        &self.contexts
    }
}

impl fmt::Display for DexError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}: {}", self.kind, self.msg)?;
        let mut connector = " for ";
        for context in &self.contexts
        {
            write!(f, "{}{}", connector, context)?;
            connector = " of ";
        }
        Ok(())
    }
}

impl std::error::Error for DexError {}

/// Attaches a section description to the error of a fallible read.
pub(crate) trait ResultExt<T>
{
    fn context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T, DexError>;
}

impl<T> ResultExt<T> for Result<T, DexError>
{
    fn context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T, DexError>
    {
        self.map_err(|e| DexError::with_context(e, context()))
    }
}
