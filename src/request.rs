//! Parsing and up-front validation of spin requests.

use postspin_schema::SpinRequest;
use postspin_utils::error::PostspinError;

/// Parse one request and check its required fields.
///
/// # Errors
///
/// `PostspinError::Request` when the JSON does not match the request shape or a
/// required field is blank.
pub fn parse_request(json: &str) -> Result<SpinRequest, PostspinError> {
    let request: SpinRequest = serde_json::from_str(json)
        .map_err(|e| PostspinError::Request(format!("malformed request JSON: {e}")))?;
    request
        .validate()
        .map_err(|issues| PostspinError::Request(issues.join("; ")))?;
    Ok(request)
}

/// Parse a JSON array of requests. Every entry is validated before any run starts.
///
/// # Errors
///
/// `PostspinError::Request` naming the first offending entry by index.
pub fn parse_batch(json: &str) -> Result<Vec<SpinRequest>, PostspinError> {
    let requests: Vec<SpinRequest> = serde_json::from_str(json)
        .map_err(|e| PostspinError::Request(format!("malformed batch JSON: {e}")))?;
    if requests.is_empty() {
        return Err(PostspinError::Request("batch contains no requests".to_string()));
    }
    for (index, request) in requests.iter().enumerate() {
        request
            .validate()
            .map_err(|issues| PostspinError::Request(format!("[{index}] {}", issues.join("; "))))?;
    }
    Ok(requests)
}
