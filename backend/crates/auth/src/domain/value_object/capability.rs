use std::fmt;

/// A privilege checked by the authorization gate.
///
/// Each capability is backed by its own allow-list table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Admin,
}

impl Capability {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Capability::Admin => "admin",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code() {
        assert_eq!(Capability::Admin.code(), "admin");
        assert_eq!(Capability::Admin.to_string(), "admin");
    }
}
