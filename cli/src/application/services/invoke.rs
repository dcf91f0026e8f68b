//! Application service: invoke the deployed function once.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{FunctionInvoker, StackProvisioner};
use crate::application::services::deploy::{StackStatus, stack_status};
use crate::domain::DeployError;

/// Stack output holding the deployed function's physical name.
pub const FUNCTION_NAME_OUTPUT: &str = "FunctionName";

/// Request body sent to the function; the handler ignores its event.
const EMPTY_EVENT: &str = "{}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub function: String,
    pub result: String,
}

/// Resolve the function from `stack_name`'s outputs and invoke it.
///
/// # Errors
///
/// Returns an error if the stack or its `FunctionName` output is missing,
/// the invoke call fails, or the function reports an error.
pub async fn invoke_function(
    provisioner: &impl StackProvisioner,
    invoker: &impl FunctionInvoker,
    stack_name: &str,
) -> Result<Invocation> {
    let outputs = match stack_status(provisioner, stack_name).await? {
        StackStatus::NotFound { stack } => return Err(DeployError::StackNotFound(stack).into()),
        StackStatus::Present { outputs, .. } => outputs,
    };
    let function = outputs
        .get(FUNCTION_NAME_OUTPUT)
        .cloned()
        .ok_or_else(|| DeployError::MissingOutput {
            stack: stack_name.to_string(),
            output: FUNCTION_NAME_OUTPUT.to_string(),
        })?;

    tracing::debug!(function = %function, "invoking function");
    let response = invoker
        .invoke(&function, EMPTY_EVENT)
        .await
        .with_context(|| format!("invoking {function}"))?;

    let payload = String::from_utf8_lossy(&response.payload).trim().to_string();
    if let Some(kind) = response.function_error {
        return Err(DeployError::FunctionFailed {
            function,
            kind,
            payload,
        }
        .into());
    }
    if !(200..300).contains(&response.status_code) {
        return Err(DeployError::CommandFailed {
            step: "invoke",
            detail: format!("status {}: {payload}", response.status_code),
        }
        .into());
    }

    Ok(Invocation {
        result: decode_result(&payload),
        function,
    })
}

/// Handlers return a JSON string; anything else is shown verbatim.
#[must_use]
pub fn decode_result(payload: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::String(s)) => s,
        _ => payload.to_string(),
    }
}
