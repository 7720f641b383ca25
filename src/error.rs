use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while parsing plugin module
/// images, building the symbol index over the configured target modules, and rewriting a
/// subject module. Each variant provides specific context about the failure mode to enable
/// appropriate error handling.
///
/// # Error Categories
///
/// ## Image Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid image structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond buffer boundaries
/// - [`Error::NotSupported`] - Unsupported image format version
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Rewriting Errors
/// - [`Error::TargetLoad`] - A configured target module could not be loaded
/// - [`Error::MultiUnit`] - The subject module violates the single-unit precondition
/// - [`Error::FacadeTarget`] - A facade replacement does not exist in any target module
///
/// # Examples
///
/// ```rust
/// use rebind::{Error, ModuleImage};
/// use std::path::Path;
///
/// match ModuleImage::from_file(Path::new("plugin.pmi")) {
///     Ok(image) => {
///         println!("Loaded module '{}'", image.name());
///     }
///     Err(Error::NotSupported) => {
///         eprintln!("Image format version is not supported");
///     }
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed image: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => {
///         eprintln!("I/O error: {}", io_err);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Image parsing Errors
    /// The image is damaged and could not be parsed.
    ///
    /// This error indicates that the image structure is corrupted or doesn't conform to the
    /// plugin module format. The error includes the source location where the malformation
    /// was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the image.
    ///
    /// This error occurs when trying to read data beyond the end of the buffer. It's a safety
    /// check to prevent buffer overruns during parsing, and records where the offending read
    /// was issued from.
    #[error("Out of bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// This image format version is not supported.
    ///
    /// Indicates that the input declares a format version this library does not understand,
    /// or uses features that are not yet implemented.
    #[error("This image format version is not supported")]
    NotSupported,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty file or buffer is provided where actual module image
    /// data was expected.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations such as reading from
    /// disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for wrapping external
    /// failures with additional context.
    #[error("{0}")]
    Error(String),

    // Rewriting Errors
    /// A configured target module could not be loaded.
    ///
    /// Raised during engine construction when one of the configured target modules cannot be
    /// opened or parsed. The whole session is aborted; a partially built symbol index is
    /// never handed out.
    ///
    /// # Fields
    ///
    /// * `path` - The path of the target module that failed to load
    /// * `source` - The underlying parse or I/O failure
    #[error("Failed to load target module '{path}': {source}")]
    TargetLoad {
        /// The path of the target module that failed to load
        path: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// The subject module contains more than one unit.
    ///
    /// Rewriting operates on single-unit modules only. A subject with multiple units
    /// violates that precondition, and the rewrite call is aborted before any mutation.
    ///
    /// The associated value is the number of units the module actually contains.
    #[error("Module contains {0} units where exactly one is required")]
    MultiUnit(usize),

    /// A facade replacement member does not exist in any target module.
    ///
    /// Raised during engine construction when a configured member mapping designates a
    /// replacement that cannot be found among the indexed target modules. Redirecting to
    /// a nonexistent member would produce an unloadable module, so this is rejected up
    /// front.
    ///
    /// # Fields
    ///
    /// * `type_name` - Full name of the replacement's declaring type
    /// * `member` - Name of the replacement member
    #[error("Facade replacement '{member}' on type '{type_name}' is not defined by any target module")]
    FacadeTarget {
        /// Full name of the replacement's declaring type
        type_name: String,
        /// Name of the replacement member
        member: String,
    },
}
