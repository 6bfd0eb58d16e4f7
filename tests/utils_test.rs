use trackcards::types::{AlbumRef, ArtistRef, Track};
use trackcards::utils::*;

// Helper function to create a test track
fn create_test_track(id: &str, name: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![ArtistRef {
            name: format!("{name} artist"),
        }],
        album: AlbumRef {
            name: format!("{name} album"),
            release_date: "2001-01-01".to_string(),
        },
    }
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier(DEFAULT_VERIFIER_LENGTH);

    assert_eq!(verifier.len(), 96);
    assert!(
        verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier(DEFAULT_VERIFIER_LENGTH);
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_verifier_respects_length() {
    assert_eq!(generate_code_verifier(43).len(), 43);
    assert_eq!(generate_code_verifier(128).len(), 128);
}

#[test]
fn test_generate_code_challenge_known_vector() {
    let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // SHA-256 digest is 32 bytes, 43 characters unpadded
    assert_eq!(challenge.len(), 43);
    assert!(!challenge.contains('='));
    assert!(!challenge.contains('+'));
    assert!(!challenge.contains('/'));

    // Should be deterministic - same input produces same output
    assert_eq!(challenge, generate_code_challenge(verifier));

    // Different input should produce different output
    assert_ne!(challenge, generate_code_challenge("different_verifier"));
}

#[test]
fn test_base64_url_encode() {
    assert_eq!(base64_url_encode(&[0xfb, 0xff]), "-_8");
    assert_eq!(base64_url_encode(b"a"), "YQ");
    assert_eq!(base64_url_encode(&[]), "");
}

#[test]
fn test_remove_duplicate_tracks_keeps_first_occurrence() {
    let mut tracks = vec![
        create_test_track("a", "First"),
        create_test_track("b", "Second"),
        create_test_track("a", "First again"),
        create_test_track("c", "Third"),
        create_test_track("b", "Second again"),
    ];

    remove_duplicate_tracks(&mut tracks);

    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(tracks[0].name, "First");
    assert_eq!(tracks[1].name, "Second");
}

#[test]
fn test_remove_duplicate_tracks_empty() {
    let mut tracks: Vec<Track> = Vec::new();
    remove_duplicate_tracks(&mut tracks);
    assert!(tracks.is_empty());
}
