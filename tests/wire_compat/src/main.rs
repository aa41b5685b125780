fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use relaydrop_protocol::messages::{
        CompleteMultipartUploadRequest, CreateMultipartUploadRequest,
        CreateMultipartUploadResponse, PresignedPartUrlsRequest, PresignedPartUrlsResponse,
        PresignedPutUrlRequest, PresignedPutUrlResponse,
    };
    use relaydrop_protocol::{Action, ActionRequest, ErrorBody};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  Rust:    {reserialized}"
        );
        parsed
    }

    // --- Requests ---

    #[test]
    fn fixture_presigned_put_url_request() {
        let req: ActionRequest<PresignedPutUrlRequest> =
            roundtrip_test("get_presigned_put_url_request.json");
        assert_eq!(req.action, Action::GetPresignedPutUrl);
        assert_eq!(req.params.bucket, "media-bucket");
    }

    #[test]
    fn fixture_create_multipart_upload_request() {
        let req: ActionRequest<CreateMultipartUploadRequest> =
            roundtrip_test("create_multipart_upload_request.json");
        assert_eq!(req.action, Action::CreateMultipartUpload);
    }

    #[test]
    fn fixture_presigned_part_urls_request() {
        let req: ActionRequest<PresignedPartUrlsRequest> =
            roundtrip_test("get_presigned_part_urls_request.json");
        assert_eq!(req.action, Action::GetPresignedPartUrls);
        assert_eq!(req.params.part_count, 3);
        assert_eq!(req.params.upload_id, "2~abcDEF");
    }

    #[test]
    fn fixture_complete_multipart_upload_request() {
        let req: ActionRequest<CompleteMultipartUploadRequest> =
            roundtrip_test("complete_multipart_upload_request.json");
        let numbers: Vec<u32> = req.params.parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(req.params.parts[0].e_tag, "\"0a1b\"");
    }

    #[test]
    fn built_request_matches_fixture() {
        let req = ActionRequest::new(
            Action::GetPresignedPartUrls,
            PresignedPartUrlsRequest {
                key: "full-game-footage/2024-05-01-Halo/Game-Video/Halo.mp4".into(),
                upload_id: "2~abcDEF".into(),
                part_count: 3,
                bucket: "media-bucket".into(),
            },
        );
        assert_eq!(
            req.to_value().unwrap(),
            load_fixture("get_presigned_part_urls_request.json")
        );
    }

    // --- Responses ---

    #[test]
    fn fixture_presigned_put_url_response() {
        let resp: PresignedPutUrlResponse = roundtrip_test("presigned_put_url_response.json");
        assert_eq!(resp.content_type.as_deref(), Some("video/mp4"));
    }

    #[test]
    fn fixture_create_multipart_upload_response() {
        let resp: CreateMultipartUploadResponse =
            roundtrip_test("create_multipart_upload_response.json");
        assert_eq!(resp.upload_id, "2~abcDEF");
    }

    #[test]
    fn fixture_presigned_part_urls_response() {
        let resp: PresignedPartUrlsResponse = roundtrip_test("presigned_part_urls_response.json");
        assert_eq!(resp.urls.len(), 3);
        assert!(resp.urls[1].contains("partNumber=2"));
    }

    #[test]
    fn fixture_error_response() {
        let body = fs::read(fixtures_dir().join("error_response.json")).unwrap();
        assert_eq!(
            ErrorBody::message_from_slice(&body).as_deref(),
            Some("expired token")
        );
    }

    #[test]
    fn responses_tolerate_unknown_fields() {
        let mut fixture = load_fixture("create_multipart_upload_response.json");
        fixture["bucket"] = serde_json::json!("media-bucket");
        fixture["key"] = serde_json::json!("k");
        let resp: CreateMultipartUploadResponse = serde_json::from_value(fixture).unwrap();
        assert_eq!(resp.upload_id, "2~abcDEF");
    }
}
