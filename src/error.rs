/// Exit code for usage and file I/O failures.
pub const EXIT_IO: u8 = 2;
/// Exit code for curve fit failures (non-convergence, non-finite parameters).
pub const EXIT_FIT: u8 = 3;
/// Exit code for terminal / UI failures.
pub const EXIT_TERMINAL: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn fit(message: impl Into<String>) -> Self {
        Self::new(EXIT_FIT, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(EXIT_TERMINAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_constructors_carry_exit_codes() {
        assert_eq!(AppError::io("x").exit_code(), EXIT_IO);
        assert_eq!(AppError::fit("x").exit_code(), EXIT_FIT);
        assert_eq!(AppError::terminal("x").exit_code(), EXIT_TERMINAL);
        assert_eq!(AppError::fit("no convergence").to_string(), "no convergence");
    }
}
