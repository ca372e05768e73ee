//! Results of operations that accept some negative return codes.

use irbis_protocol::describe_return_code;

/// Value of an operation whose reply may carry an ignorable negative code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The server reported success.
    Ok(T),
    /// The server reported an accepted negative code. `value` holds whatever
    /// the reply still carried (often an empty record or list).
    Ignored { code: i32, value: T },
}

impl<T> Outcome<T> {
    /// Wraps `value` according to the return code.
    pub fn from_code(code: i32, value: T) -> Self {
        if code < 0 {
            Outcome::Ignored { code, value }
        } else {
            Outcome::Ok(value)
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    /// The accepted negative code, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Ignored { code, .. } => Some(*code),
        }
    }

    /// Server description of the code.
    pub fn message(&self) -> &'static str {
        describe_return_code(self.code().unwrap_or(0))
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Ignored { value, .. } => value,
        }
    }

    /// Returns the carried value regardless of the code.
    pub fn into_value(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Ignored { value, .. } => value,
        }
    }

    /// Returns the value only when the server reported success.
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(value) => Some(value),
            Outcome::Ignored { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Ignored { code, value } => Outcome::Ignored {
                code,
                value: f(value),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Outcome::from_code(0, 1), Outcome::Ok(1));
        assert_eq!(Outcome::from_code(17, 1), Outcome::Ok(1));
        assert_eq!(
            Outcome::from_code(-603, 1),
            Outcome::Ignored { code: -603, value: 1 }
        );
    }

    #[test]
    fn test_accessors() {
        let outcome = Outcome::from_code(-201, vec![1, 2]);
        assert!(!outcome.is_ok());
        assert_eq!(outcome.code(), Some(-201));
        assert_eq!(outcome.value().len(), 2);
        assert_eq!(outcome.clone().map(|v| v.len()).into_value(), 2);
        assert!(outcome.ok().is_none());

        let outcome = Outcome::Ok("x");
        assert_eq!(outcome.code(), None);
        assert_eq!(outcome.message(), irbis_protocol::error::NORMAL_COMPLETION);
        assert_eq!(outcome.ok(), Some("x"));
    }
}
