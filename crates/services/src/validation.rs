//! Format-level checks that run before any lock is taken.

use domains::ValidationError;

/// Field length limits, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub name_max: usize,
    pub content_max: usize,
    pub passcode_min: usize,
    pub passcode_max: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            name_max: 30,
            content_max: 1_000,
            passcode_min: 4,
            passcode_max: 32,
        }
    }
}

impl Limits {
    pub fn name(&self, name: &str) -> Result<(), ValidationError> {
        bounded_text("name", name, self.name_max)
    }

    pub fn content(&self, content: &str) -> Result<(), ValidationError> {
        bounded_text("content", content, self.content_max)
    }

    pub fn passcode(&self, passcode: &str) -> Result<(), ValidationError> {
        let len = passcode.chars().count();
        if len < self.passcode_min || len > self.passcode_max {
            return Err(ValidationError::PasscodeLength {
                min: self.passcode_min,
                max: self.passcode_max,
            });
        }
        Ok(())
    }
}

pub fn id(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::InvalidId { field, value });
    }
    Ok(())
}

fn bounded_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
