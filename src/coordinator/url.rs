//! Runner request URL construction

use thiserror::Error;
use url::Url;

/// Path segment appended to every machine's base address
const RUNNER_PATH: &str = "runner";

/// Query parameter carrying the target URL
const TARGET_PARAM: &str = "url";

/// The endpoint base address could not be combined into a request URL
#[derive(Error, Debug)]
#[error("cannot build runner request from {endpoint}: {source}")]
pub struct MalformedRequestError {
    pub endpoint: Url,
    #[source]
    pub source: url::ParseError,
}

/// Build the run-trigger URL for one machine.
///
/// The override target wins over the configured one; empty strings count as
/// absent. The chosen target travels percent-encoded in a single `url`
/// query parameter, omitted entirely when no target is set.
pub fn build_runner_url(
    endpoint: &Url,
    override_url: Option<&str>,
    configured_url: Option<&str>,
) -> Result<Url, MalformedRequestError> {
    let mut raw = endpoint.as_str().trim_end_matches('/').to_string();
    raw.push('/');
    raw.push_str(RUNNER_PATH);

    let mut url = Url::parse(&raw).map_err(|source| MalformedRequestError {
        endpoint: endpoint.clone(),
        source,
    })?;

    let target = override_url
        .filter(|u| !u.is_empty())
        .or_else(|| configured_url.filter(|u| !u.is_empty()));

    if let Some(target) = target {
        url.query_pairs_mut().append_pair(TARGET_PARAM, target);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_appends_runner_segment() {
        let url = build_runner_url(&endpoint("http://a"), None, None).unwrap();
        assert_eq!(url.as_str(), "http://a/runner");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_trailing_slash_collapses() {
        let url = build_runner_url(&endpoint("http://a/"), None, None).unwrap();
        assert_eq!(url.as_str(), "http://a/runner");
    }

    #[test]
    fn test_base_path_is_kept() {
        let url = build_runner_url(&endpoint("http://host:8201/agent"), None, None).unwrap();
        assert_eq!(url.as_str(), "http://host:8201/agent/runner");
    }

    #[test]
    fn test_override_is_encoded() {
        let url =
            build_runner_url(&endpoint("http://a"), Some("http://target/page"), None).unwrap();
        assert_eq!(url.as_str(), "http://a/runner?url=http%3A%2F%2Ftarget%2Fpage");
    }

    #[test]
    fn test_override_beats_configured() {
        let url = build_runner_url(
            &endpoint("http://a"),
            Some("http://target/page"),
            Some("http://configured/suite"),
        )
        .unwrap();
        assert_eq!(url.query(), Some("url=http%3A%2F%2Ftarget%2Fpage"));
    }

    #[test]
    fn test_configured_used_without_override() {
        let url =
            build_runner_url(&endpoint("http://a"), None, Some("http://configured/suite")).unwrap();
        assert_eq!(url.query(), Some("url=http%3A%2F%2Fconfigured%2Fsuite"));
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let url = build_runner_url(&endpoint("http://a"), Some(""), Some("")).unwrap();
        assert!(url.query().is_none());

        let url = build_runner_url(&endpoint("http://a"), Some(""), Some("http://c")).unwrap();
        assert_eq!(url.query(), Some("url=http%3A%2F%2Fc"));
    }

    #[test]
    fn test_reserved_characters_round_trip() {
        let target = "http://t/p?a=1&b=two words:here";
        let url = build_runner_url(&endpoint("http://a"), Some(target), None).unwrap();

        let (key, decoded) = url.query_pairs().next().unwrap();
        assert_eq!(key, "url");
        assert_eq!(decoded, target);
        assert_eq!(url.query_pairs().count(), 1);
    }
}
