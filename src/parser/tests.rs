//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::parser::{
        parse_request, parse_request_head, BodyError, Error, Headers, HttpRequest, HttpVersion,
        Method,
    };

    fn json_headers() -> Headers {
        [("Host", "example.com"), ("Content-Type", "application/json")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/index.html");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.body().unwrap(), b"");
    }

    #[test]
    fn test_parse_request_with_multiple_headers() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test\r\nAccept: */*\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.len(), 3);
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
        assert_eq!(result.headers.get("Accept").unwrap(), "*/*");
    }

    #[test]
    fn test_case_insensitive_headers() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert!(result.has_header("host"));
        assert!(result.has_header("HOST"));
        assert!(result.has_header("Host"));
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /index.html HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_invalid_method() {
        let request = b"GE(T /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "GE(T"));
    }

    #[test]
    fn test_extension_method_is_case_sensitive() {
        let request = b"get /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::Extension("get".to_string()));
        assert_ne!(result.method, Method::GET);
        assert_eq!(result.method.to_string(), "get");
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /index.html HTTP/9.9\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/9.9"));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /index.html HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_empty_request() {
        let result = parse_request(b"");
        assert!(matches!(result, Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_incomplete_request_line() {
        let result = parse_request(b"GET\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_all_methods() {
        let methods = vec![
            ("GET", Method::GET),
            ("HEAD", Method::HEAD),
            ("POST", Method::POST),
            ("PUT", Method::PUT),
            ("DELETE", Method::DELETE),
            ("CONNECT", Method::CONNECT),
            ("OPTIONS", Method::OPTIONS),
            ("TRACE", Method::TRACE),
            ("PATCH", Method::PATCH),
        ];

        for (name, expected_method) in methods {
            let request = format!("{name} /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");
            let result = parse_request(request.as_bytes()).unwrap();
            assert_eq!(result.method, expected_method);
            assert_eq!(result.method.to_string(), name);
        }
    }

    #[test]
    fn test_headers_with_multiple_colons() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: value:with:colons\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("X-Test").unwrap(), "value:with:colons");
    }

    #[test]
    fn test_http10_without_host() {
        // HTTP/1.0 doesn't require a Host header
        let request = b"GET /index.html HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_http_version_display() {
        assert_eq!(HttpVersion::Http10.to_string(), "HTTP/1.0");
        assert_eq!(HttpVersion::Http11.to_string(), "HTTP/1.1");
        assert_eq!(HttpVersion::Http20.to_string(), "HTTP/2");
        assert_eq!("HTTP/2.0".parse::<HttpVersion>().unwrap(), HttpVersion::Http20);
        assert!(HttpVersion::Http11.requires_host());
        assert!(!HttpVersion::Http10.requires_host());
    }

    #[test]
    fn test_headers_with_trailing_whitespace() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com  \r\nUser-Agent:  test  \r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
    }

    #[test]
    fn test_empty_path() {
        let request = b"GET  HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_path_with_query_parameters() {
        let request = b"GET /search?q=test&flag&empty= HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/search?q=test&flag&empty=");
        assert_eq!(result.get_query_param("q").unwrap(), "test");
        assert_eq!(result.get_query_param("flag").unwrap(), "");
        assert!(result.has_query_param("empty"));
        assert!(!result.has_query_param("page"));
    }

    #[test]
    fn test_malformed_utf8_in_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: \xFF\xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(ref s)) if s == "Invalid UTF-8"));
    }

    #[test]
    fn test_duplicate_headers_are_kept_in_order() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: value1\r\nx-test: value2\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("X-Test").unwrap(), "value1");
        assert_eq!(result.headers.get_all("X-TEST"), ["value1", "value2"]);
        assert_eq!(result.headers.len(), 2);
    }

    #[test]
    fn test_headers_add_never_deduplicates() {
        let mut headers = Headers::new();
        headers.add("Key", "Value");
        headers.add("key", "Value");
        headers.add("Other", "1");
        assert_eq!(headers.get_all("KEY"), ["Value", "Value"]);

        let keys: Vec<&str> = headers.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["Key", "Other"]);

        assert_eq!(headers.remove("key"), Some(vec!["Value".to_string(), "Value".to_string()]));
        assert!(!headers.contains_key("Key"));
    }

    #[test]
    fn test_headers_extend() {
        let mut headers = Headers::new();
        headers.add("Key1", "a");
        headers.extend([("Key1", vec!["b", "c"]), ("Key2", vec!["d"])]);
        assert_eq!(headers.get_all("Key1"), ["a", "b", "c"]);
        assert_eq!(headers.get_all("Key2"), ["d"]);
        assert!(headers.get_all("Key3").is_empty());
    }

    #[test]
    fn test_http_request_accessors() {
        let request = HttpRequest::new(Method::GET, "/index.html", HttpVersion::Http11, json_headers());

        assert_eq!(request.get_header("host").unwrap(), "example.com");
        assert!(request.get_header("X-Test").is_none());
        assert!(request.has_header("HOST"));
        assert!(!request.has_header("X-Test"));
        assert!(request.is_json());

        let request_with_body = HttpRequest::with_body(
            Method::POST,
            "/api",
            HttpVersion::Http11,
            json_headers(),
            b"{\"key\":\"value\"}".to_vec(),
        );
        assert_eq!(request_with_body.method, Method::POST);
        assert_eq!(request_with_body.body().unwrap(), b"{\"key\":\"value\"}");
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestUser {
        name: String,
        email: String,
    }

    #[test]
    fn test_json_parsing() {
        let body = r#"{"name":"John Doe","email":"john@example.com"}"#;
        let request = HttpRequest::with_body(Method::POST, "/api/users", HttpVersion::Http11, json_headers(), body);

        let user: TestUser = request.json().unwrap();
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "john@example.com");

        let plain: Headers = [("Content-Type", "text/plain")].into_iter().collect();
        let request_no_json = HttpRequest::with_body(Method::POST, "/api/users", HttpVersion::Http11, plain, body);
        let result: Result<TestUser, _> = request_no_json.json();
        assert!(matches!(result, Err(Error::MissingHeader(_))));

        let invalid = HttpRequest::with_body(Method::POST, "/api/users", HttpVersion::Http11, json_headers(), r#"{"name":}"#);
        let result: Result<TestUser, _> = invalid.json();
        assert!(matches!(result, Err(Error::JsonError(_))));
    }

    #[test]
    fn test_complex_request_with_body() {
        let request = b"POST /api/users?role=admin HTTP/1.1\r\n\
            Host: example.com\r\n\
            Content-Type: application/json\r\n\
            Content-Length: 46\r\n\
            X-API-Key: secret-key\r\n\
            \r\n\
            {\"name\":\"John Doe\",\"email\":\"john@example.com\"}";

        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::POST);
        assert_eq!(result.path, "/api/users?role=admin");
        assert_eq!(result.headers.get("X-API-Key").unwrap(), "secret-key");
        assert_eq!(result.get_query_param("role").unwrap(), "admin");
        assert_eq!(result.content_length(), Ok(Some(46)));

        let user: TestUser = result.json().unwrap();
        assert_eq!(user.name, "John Doe");
    }

    #[test]
    fn test_parse_request_head_reports_head_length() {
        let head = b"PUT /x HTTP/1.1\r\nHost: a\r\nContent-Length: 3\r\n\r\n";
        let mut input = head.to_vec();
        input.extend_from_slice(b"abc");

        let (request, head_len) = parse_request_head(&input).unwrap();
        assert_eq!(head_len, head.len());
        assert_eq!(request.body().unwrap(), b"");
    }

    #[test]
    fn test_body_is_truncated_to_content_length() {
        let request = b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 4\r\n\r\nTest Body";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body().unwrap(), b"Test");
    }

    #[test]
    fn test_short_body_is_a_read_error() {
        let request = b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 20\r\n\r\nTest Body";
        let result = parse_request(request).unwrap();
        assert_eq!(
            result.body(),
            Err(BodyError::Incomplete { expected: 20, received: 9 })
        );
    }

    #[test]
    fn test_body_framing_errors() {
        let chunked = b"POST / HTTP/1.1\r\nHost: a\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nTest\r\n0\r\n\r\n";
        let result = parse_request(chunked).unwrap();
        assert!(matches!(result.body(), Err(BodyError::UnsupportedTransferEncoding(ref c)) if c == "chunked"));

        let bad_length = b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: ten\r\n\r\n";
        let result = parse_request(bad_length).unwrap();
        assert!(matches!(result.body(), Err(BodyError::InvalidContentLength(_))));

        let conflicting = b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 1\r\nContent-Length: 2\r\n\r\nab";
        let result = parse_request(conflicting).unwrap();
        assert!(matches!(result.json::<TestUser>(), Err(Error::MissingHeader(_))));
        assert!(result.body().is_err());
    }
}
