use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::FetchError;

/// The subset of a `GET /repos/{owner}/{repo}/contents/{path}` response we use.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentsResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Decode a contents API payload into text.
///
/// Returns `Ok(None)` when the payload is not base64-encoded or decodes to
/// blank text, so the caller can move on to the next source.
pub(crate) fn decode_contents(response: &ContentsResponse) -> Result<Option<String>, FetchError> {
    let (Some("base64"), Some(content)) = (response.encoding.as_deref(), &response.content) else {
        return Ok(None);
    };

    let compact: String = content
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|error| FetchError::Decode(error.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|error| FetchError::Decode(error.to_string()))?;

    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentsResponse, decode_contents};
    use crate::error::FetchError;

    fn response(content: Option<&str>, encoding: Option<&str>) -> ContentsResponse {
        ContentsResponse {
            content: content.map(str::to_string),
            encoding: encoding.map(str::to_string),
        }
    }

    #[test]
    fn decodes_wrapped_base64() {
        // "## v1.0.0\n- [ ] ship\n" split across lines the way the API returns it.
        let payload = response(Some("IyMgdjEuMC4wCi0gWyBd\nIHNoaXAK\n"), Some("base64"));

        let text = decode_contents(&payload).expect("payload should decode");
        assert_eq!(text.as_deref(), Some("## v1.0.0\n- [ ] ship\n"));
    }

    #[test]
    fn non_base64_encoding_is_skipped() {
        let payload = response(Some("## v1.0.0"), Some("utf-8"));
        assert!(matches!(decode_contents(&payload), Ok(None)));

        let payload = response(None, Some("base64"));
        assert!(matches!(decode_contents(&payload), Ok(None)));
    }

    #[test]
    fn blank_documents_are_skipped() {
        let payload = response(Some("ICAK"), Some("base64"));
        assert!(matches!(decode_contents(&payload), Ok(None)));
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let payload = response(Some("!!!not base64!!!"), Some("base64"));
        assert!(matches!(
            decode_contents(&payload),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn contents_response_tolerates_extra_fields() {
        let parsed: ContentsResponse = serde_json::from_value(serde_json::json!({
            "name": "ROADMAP.md",
            "path": "ROADMAP.md",
            "sha": "abc",
            "content": "IyMgdjEuMC4wCg==\n",
            "encoding": "base64"
        }))
        .expect("contents response should deserialize");

        assert_eq!(
            decode_contents(&parsed)
                .expect("payload should decode")
                .as_deref(),
            Some("## v1.0.0\n")
        );
    }
}
