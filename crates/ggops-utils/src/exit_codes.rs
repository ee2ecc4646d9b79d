//! Exit code constants for the ggops CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CONFIG` | Invalid CLI arguments, configuration, template or catalog |
//! | 7 | `INSUFFICIENT_SLOTS` | Rendered tables did not fit the table prm files |
//! | 10 | `STOP_TIMEOUT` | A replication process did not stop in time |
//! | 70 | `CONTROL_PLANE_FAILURE` | The REST control plane call failed |

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use ggops_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::INSUFFICIENT_SLOTS.as_i32(), 7);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid CLI arguments or configuration
    pub const CONFIG: ExitCode = ExitCode(2);

    /// Packing needed more table prm files than configured
    pub const INSUFFICIENT_SLOTS: ExitCode = ExitCode(7);

    /// Process stop polling exceeded the configured timeout
    pub const STOP_TIMEOUT: ExitCode = ExitCode(10);

    /// REST control plane call failed
    pub const CONTROL_PLANE_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
