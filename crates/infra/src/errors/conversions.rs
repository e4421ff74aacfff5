//! Conversions from external infrastructure errors into domain errors.

use cranepay_domain::PayrollError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PayrollError);

impl From<InfraError> for PayrollError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PayrollError> for InfraError {
    fn from(value: PayrollError) -> Self {
        InfraError(value)
    }
}

trait IntoPayrollError {
    fn into_payroll(self) -> PayrollError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PayrollError */
/* -------------------------------------------------------------------------- */

impl IntoPayrollError for HttpError {
    fn into_payroll(self) -> PayrollError {
        if self.is_builder() {
            return PayrollError::InvalidUrl(self.to_string());
        }

        if self.is_timeout() {
            return PayrollError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return PayrollError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return PayrollError::Decoding(self.to_string());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message = status.canonical_reason().unwrap_or("unknown status").to_string();
            return PayrollError::Server { code, message };
        }

        PayrollError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_payroll())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → PayrollError */
/* -------------------------------------------------------------------------- */

impl IntoPayrollError for JsonError {
    fn into_payroll(self) -> PayrollError {
        if self.is_io() || self.is_eof() {
            PayrollError::InvalidResponse(format!("truncated response body: {self}"))
        } else {
            PayrollError::Decoding(self.to_string())
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_payroll())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
