//! Macro for implementing `as_str`, Display and FromStr for status enums
//!
//! Status enums travel over the wire as snake_case strings
//! (`"ready_for_approval"`, `"changes_requested"`). This macro keeps the
//! string table in one place for display, parsing and query parameters.
//!
//! # Example
//!
//! ```rust
//! use cranepay_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SyncState {
//!     Idle,
//!     Syncing,
//! }
//!
//! impl_domain_status_conversions!(SyncState {
//!     Idle => "idle",
//!     Syncing => "syncing",
//! });
//!
//! assert_eq!(SyncState::Syncing.as_str(), "syncing");
//! assert_eq!("IDLE".parse::<SyncState>().unwrap(), SyncState::Idle);
//! ```

/// Implements `as_str`, Display and FromStr for status enums
///
/// Parsing is case-insensitive; output is always the canonical lowercase
/// form.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire representation
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStatus {
        Draft,
        ReadyForApproval,
        Cancelled,
    }

    impl_domain_status_conversions!(TestStatus {
        Draft => "draft",
        ReadyForApproval => "ready_for_approval",
        Cancelled => "cancelled",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestStatus::Draft.to_string(), "draft");
        assert_eq!(TestStatus::ReadyForApproval.to_string(), "ready_for_approval");
        assert_eq!(TestStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(TestStatus::from_str("Draft").unwrap(), TestStatus::Draft);
        assert_eq!(
            TestStatus::from_str("READY_FOR_APPROVAL").unwrap(),
            TestStatus::ReadyForApproval
        );
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestStatus::from_str("sent");
        assert!(result.unwrap_err().contains("Invalid TestStatus: sent"));
        assert!(TestStatus::from_str("").is_err());
    }
}
