//! Verify build and parse behaviour against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Request vectors describe the descriptor each endpoint builder must produce;
//! response vectors describe raw responses and the payload or failure they
//! classify to. Comparing parsed JSON (not raw strings) avoids false negatives
//! from field-ordering differences.

use keystore_core::{
    ApiError, ClientConfig, Credentials, HttpMethod, HttpRequest, HttpResponse, KeyAlgorithm,
    KeySize, KeystoreClient, Payload, RandomAlgorithm, Rejection,
};
use serde_json::Value;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_algorithm(s: &str) -> KeyAlgorithm {
    match s {
        "aes" => KeyAlgorithm::Aes,
        "rsa" => KeyAlgorithm::Rsa,
        "dsa" => KeyAlgorithm::Dsa,
        other => panic!("unknown algorithm: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn input_str<'a>(case: &'a Value, field: &str) -> &'a str {
    case["input"][field].as_str().unwrap()
}

fn build(client: &KeystoreClient, creds: &Credentials, case: &Value) -> HttpRequest {
    let text = || input_str(case, "text");
    let alias = || input_str(case, "alias");
    let built = match case["operation"].as_str().unwrap() {
        "create_keystore" => client.build_create_keystore(creds),
        "login_keystore" => client.build_login_keystore(creds),
        "generate_key" => {
            let input = &case["input"];
            client.build_generate_key(
                parse_algorithm(input["algorithm"].as_str().unwrap()),
                creds,
                input["name"].as_str().unwrap(),
                KeySize(input["key_size"].as_u64().unwrap() as u32),
                input["random_algorithm"]
                    .as_str()
                    .map(|s| RandomAlgorithm::from(s.to_string())),
            )
        }
        "load_aes_key" => client.build_load_aes_key(creds, alias()),
        "encrypt_aes" => client.build_encrypt_aes(creds, alias(), text()),
        "decrypt_aes" => client.build_decrypt_aes(creds, alias(), text()),
        "list_aliases" => client.build_list_aliases(creds),
        "filter_aliases" => client.build_filter_aliases(creds, input_str(case, "filter")),
        "encrypt_rsa" => client.build_encrypt_rsa(alias(), text()),
        "decrypt_rsa" => client.build_decrypt_rsa(creds, alias(), text()),
        "rsa_public_key" => client.build_rsa_public_key(alias()),
        "rsa_private_key" => client.build_rsa_private_key(creds, alias()),
        "dsa_public_key" => client.build_dsa_public_key(alias()),
        "dsa_private_key" => client.build_dsa_private_key(creds, alias()),
        "sign_text" => client.build_sign_text(creds, alias(), text()),
        "verify_signature" => {
            client.build_verify_signature(alias(), text(), input_str(case, "signature"))
        }
        "public_keys" => client.build_public_keys(),
        other => panic!("unknown operation: {other}"),
    };
    built.unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let base = vectors["base_url"].as_str().unwrap();
    let client = KeystoreClient::new(ClientConfig::new(base).unwrap());
    let creds: Credentials = serde_json::from_value(vectors["credentials"].clone()).unwrap();

    let cases = vectors["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 19, "one vector per endpoint builder");

    for case in cases {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(&client, &creds, case);

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{base}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");

        match &expected["body"] {
            Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
            body => {
                let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&req_body, body, "{name}: body");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn expected_payload(value: &Value) -> Payload {
    let (tag, inner) = value.as_object().unwrap().iter().next().unwrap();
    match tag.as_str() {
        "PlainText" => Payload::PlainText(inner.as_str().unwrap().to_string()),
        "HtmlWrapped" => Payload::HtmlWrapped(inner.as_str().unwrap().to_string()),
        "ParsedJson" => Payload::ParsedJson(inner.clone()),
        other => panic!("unknown payload tag: {other}"),
    }
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let client = KeystoreClient::new(ClientConfig::new("http://localhost:3000/api/crypto/").unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: pairs(&sim["headers"]),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = client.parse_payload(&response);

        if let Some(expected) = case.get("expected_payload") {
            assert_eq!(result.unwrap(), expected_payload(expected), "{name}: payload");
        } else if let Some(expected) = case.get("expected_rejection") {
            let expected: Rejection = serde_json::from_value(expected.clone()).unwrap();
            match result {
                Err(ApiError::Rejected(rejection)) => {
                    assert_eq!(rejection, expected, "{name}: rejection")
                }
                other => panic!("{name}: expected rejection, got {other:?}"),
            }
        } else {
            match case["expected_error"].as_str().unwrap() {
                "Parse" => assert!(matches!(result, Err(ApiError::Parse(_))), "{name}: expected Parse"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        }
    }
}
