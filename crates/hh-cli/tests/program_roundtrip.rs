use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("hihippo-roundtrip-{}-{}", name, nanos))
}

fn hihippo(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hihippo"))
        .args(args)
        .output()
        .expect("cli should execute")
}

#[test]
fn encode_decode_round_trip_through_binary() {
    let code = "greeting = \"say \\\"hi\\\", then go\"\nforever:\n    print greeting\n";
    let source = temp_path("source.hh");
    let document = temp_path("document.json");
    fs::write(&source, code).expect("source should be written");

    let encoded = hihippo(&[
        "encode",
        "--input",
        source.to_str().expect("utf8"),
        "--output",
        document.to_str().expect("utf8"),
    ]);
    assert!(encoded.status.success());
    assert!(String::from_utf8_lossy(&encoded.stdout).starts_with("RESULT:OK"));

    let decoded = hihippo(&["decode", "--input", document.to_str().expect("utf8")]);
    assert!(decoded.status.success());
    assert_eq!(String::from_utf8_lossy(&decoded.stdout), code);

    let validated = hihippo(&["validate", "--input", document.to_str().expect("utf8")]);
    let stdout = String::from_utf8_lossy(&validated.stdout);
    assert!(stdout.contains("VALID_JSON:true"));
    assert!(stdout.contains("HAS_CODE:true"));
}

#[test]
fn decode_rejects_documents_without_code() {
    let document = temp_path("nocode.json");
    fs::write(&document, "{\"program\": \"print 1\"}").expect("document should be written");

    let output = hihippo(&["decode", "--input", document.to_str().expect("utf8")]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR_CODE:PROGRAM_CODE_MISSING"));
    assert!(stdout.contains("does not contain a 'code' field"));
}
